pub mod authorization;
pub mod handlers;
pub mod middleware;
pub mod router;
