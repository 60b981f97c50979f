use std::{
    collections::{HashMap, VecDeque},
    future::{ready, Ready},
    rc::Rc,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;

use crate::errors::AppError;

/// Sliding-window request counter keyed by client address.
///
/// Expired timestamps are evicted from a key on every check, and the
/// whole map is swept once per window so keys that went quiet do not
/// accumulate for the lifetime of the process. Constructed once in main
/// and injected; holds no global state.
pub struct RateLimiter {
    window: Duration,
    max_requests: usize,
    inner: Mutex<RateLimiterState>,
}

struct RateLimiterState {
    requests: HashMap<String, VecDeque<Instant>>,
    last_sweep: Instant,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests,
            inner: Mutex::new(RateLimiterState {
                requests: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Returns true when the request is within the limit, recording it.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut state = self.inner.lock().expect("rate limiter lock poisoned");

        if now.duration_since(state.last_sweep) >= self.window {
            let window = self.window;
            state.requests.retain(|_, times| {
                while times
                    .front()
                    .is_some_and(|t| now.duration_since(*t) >= window)
                {
                    times.pop_front();
                }
                !times.is_empty()
            });
            state.last_sweep = now;
        }

        let times = state.requests.entry(key.to_string()).or_default();
        while times
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            times.pop_front();
        }

        if times.len() >= self.max_requests {
            return false;
        }

        times.push_back(now);
        true
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.inner
            .lock()
            .expect("rate limiter lock poisoned")
            .requests
            .len()
    }
}

pub struct RateLimitMiddleware {
    limiter: Arc<RateLimiter>,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: Arc::clone(&self.limiter),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Arc<RateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let key = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        let allowed = self.limiter.check(&key);
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if !allowed {
                return Err(AppError::TooManyRequests(
                    "Too many requests, please try again later".to_string(),
                )
                .into());
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
