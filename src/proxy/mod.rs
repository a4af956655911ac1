//! HTTP service module.
//!
//! Exposes the chat proxy and model listing endpoints the site's front-end
//! calls, and forwards them to the generative-language API.

mod handlers;
mod server;
pub mod types;

pub use handlers::validate_chat_payload;
pub use server::{create_router, run_server, AppState, RequestId, REQUEST_ID_HEADER};
pub use types::{ChatRequest, ChatResponse, ConversationMessage, ModelDescriptor, Role};
