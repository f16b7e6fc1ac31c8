//! CRUD orchestration over one key-value table.
//!
//! [`EntityManager`] owns the resolved types and the store client; a
//! [`Session`] runs each operation through the write pipeline, dispatches it
//! through the middleware chain, and rehydrates what comes back.
mod codec;
mod cursor;
mod expected;
mod manager;
mod memory;
mod middleware;
mod rehydrate;
mod session;
pub mod store;
mod write;


pub use codec::{TokenDecodeError, decode_token, encode_token};
pub use cursor::ResultCursor;
pub use expected::Expected;
pub use manager::{EntityManager, ManagerConfig};
pub use memory::MemoryStore;
pub use middleware::{WriteMiddleware, WriteRequest};
pub use session::{Order, Session};
pub use store::{
    ContinuationToken, DeleteRequest, GetRequest, PutRequest, QueryPage, QueryRequest,
    StoreClient, StoreError,
};
