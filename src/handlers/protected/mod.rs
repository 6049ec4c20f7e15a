// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here runs behind jwt_auth_middleware and receives the
// caller's AuthUser through request extensions.

pub mod user;
