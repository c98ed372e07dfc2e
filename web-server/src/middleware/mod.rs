pub mod login_gate;
pub mod rate_limiter;

pub use login_gate::RequireLogin;
pub use rate_limiter::RateLimiter;
