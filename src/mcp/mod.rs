// MCP protocol: envelope types, validation, dispatch, tools and SSE sessions
pub mod handler;
pub mod protocol;
pub mod session;
pub mod tools;
pub mod validation;
