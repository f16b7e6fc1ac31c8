use crate::{
    context::SessionContext,
    db::store::{DeleteRequest, PutRequest},
    error::Error,
};

///
/// WriteRequest
///
/// Outgoing write as seen by middleware, just before dispatch.
///

#[derive(Clone, Debug)]
pub enum WriteRequest {
    Put(PutRequest),
    Delete(DeleteRequest),
}

impl WriteRequest {
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::Put(put) => put.table.as_str(),
            Self::Delete(delete) => delete.table.as_str(),
        }
    }
}

///
/// WriteMiddleware
///
/// Ordered hook over every put and delete. Hooks run in registration order;
/// an error aborts the write before it reaches the store.
///

pub trait WriteMiddleware: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn apply(&self, request: &mut WriteRequest, session: &SessionContext) -> Result<(), Error>;
}

impl<F> WriteMiddleware for F
where
    F: Fn(&mut WriteRequest, &SessionContext) -> Result<(), Error> + Send + Sync,
{
    fn apply(&self, request: &mut WriteRequest, session: &SessionContext) -> Result<(), Error> {
        self(request, session)
    }
}
