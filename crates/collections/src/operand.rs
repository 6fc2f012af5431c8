//! Operand classification for cross-collection operations
//!
//! Before an operation mixing two collections executes, both operands are
//! classified once, and the strategy follows from the class:
//!
//! | Operand | Strategy |
//! |---|---|
//! | `RemoteSameConn` | native multi-key command or one transaction |
//! | `RemoteOtherConn` | fetch to local memory, combine, write back |
//! | `Local` | combine with the in-process collection locally |
//!
//! The classification happens at one dispatch point per operation -
//! never scattered through the operation body.

use tether_store::Connection;

/// Where an operand's data lives relative to the collection doing the work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandClass {
    /// Remote collection on the same backend - native multi-key commands
    /// and shared transactions apply.
    RemoteSameConn,
    /// Remote collection on a different backend - no cross-backend
    /// atomicity exists; treated like a local operand after fetching.
    RemoteOtherConn,
    /// Plain in-process collection.
    Local,
}

impl OperandClass {
    /// Classify an operand given the connection of the collection doing
    /// the work and the operand's own connection (`None` for in-process
    /// operands).
    pub fn classify(own: &Connection, operand: Option<&Connection>) -> OperandClass {
        match operand {
            Some(other) if own.same_backend(other) => OperandClass::RemoteSameConn,
            Some(_) => OperandClass::RemoteOtherConn,
            None => OperandClass::Local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tether_store::MemoryStore;

    #[test]
    fn classification_matches_backend_identity() {
        let a = Connection::new(Arc::new(MemoryStore::new()));
        let b = a.clone();
        let c = Connection::new(Arc::new(MemoryStore::new()));

        assert_eq!(
            OperandClass::classify(&a, Some(&b)),
            OperandClass::RemoteSameConn
        );
        assert_eq!(
            OperandClass::classify(&a, Some(&c)),
            OperandClass::RemoteOtherConn
        );
        assert_eq!(OperandClass::classify(&a, None), OperandClass::Local);
    }
}
