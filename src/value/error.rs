//! Value operation errors.
//!
//! These are raised by the operator dispatch and the coercion helpers; each
//! names the type(s) involved.

use thiserror::Error;

/// An operation a value cannot perform.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// `dot` with a member the type does not have.
    #[error("Type {type_name} has no member {member}")]
    NoSuchMember {
        type_name: &'static str,
        member: String,
    },

    /// An operator the type does not support.
    #[error("Operation {operation} is invalid for type {type_name}")]
    InvalidOperation {
        type_name: &'static str,
        operation: &'static str,
    },

    /// An operand of the wrong type where an exact type is required.
    #[error("Expected type {expected}, but found {found}.")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A conversion between types that have none.
    #[error("Can not convert from type {from} to {to}.")]
    InvalidConversion {
        from: &'static str,
        to: &'static str,
    },
}

impl ValueError {
    pub fn no_such_member(type_name: &'static str, member: impl Into<String>) -> Self {
        ValueError::NoSuchMember {
            type_name,
            member: member.into(),
        }
    }

    pub fn invalid_operation(type_name: &'static str, operation: &'static str) -> Self {
        ValueError::InvalidOperation {
            type_name,
            operation,
        }
    }

    pub fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        ValueError::TypeMismatch { expected, found }
    }

    pub fn invalid_conversion(from: &'static str, to: &'static str) -> Self {
        ValueError::InvalidConversion { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ValueError::no_such_member("String", "size").to_string(),
            "Type String has no member size"
        );
        assert_eq!(
            ValueError::invalid_operation("Null", "add").to_string(),
            "Operation add is invalid for type Null"
        );
        assert_eq!(
            ValueError::type_mismatch("Number", "String").to_string(),
            "Expected type Number, but found String."
        );
        assert_eq!(
            ValueError::invalid_conversion("List", "Number").to_string(),
            "Can not convert from type List to Number."
        );
    }
}
