use crate::reply::Reply;

/// Sole owner of a reply tree that still holds data for the caller
///
/// Handles are created by the invoker for replies which did not fit the caller buffer or are arrays.
/// They can't be cloned, so the tree is released exactly once: either by [release](Self::release),
/// by [take_payload](crate::reply::take_payload), or when the handle is dropped.
#[derive(Debug, PartialEq, Eq)]
pub struct ReplyHandle {
    reply: Box<Reply>,
}

impl ReplyHandle {
    pub(crate) fn new(reply: Reply) -> Self {
        ReplyHandle { reply: Box::new(reply) }
    }

    pub fn reply(&self) -> &Reply {
        &self.reply
    }

    /// Releases the reply including all nested elements
    pub fn release(self) {
        tracing::trace!(tag = ?self.reply.tag(), elements = self.reply.element_count(), "releasing reply");
        drop(self.reply);
    }
}
