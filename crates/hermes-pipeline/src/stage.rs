//! Pipeline stages.

use std::fmt;

/// One step of the fixed request sequence.
///
/// Every stage may short-circuit to the error-render terminal state; the
/// order cannot be changed by endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Request method must equal the declared method.
    MethodCheck = 1,
    /// Section permissions (e.g. login required).
    SectionPermissionCheck = 2,
    /// `query_form` validation.
    QueryValidate = 3,
    /// Body parsing and `body_form` validation.
    BodyValidate = 4,
    /// Business logic.
    Execute = 5,
    /// `serializer` applied to the result.
    Serialize = 6,
    /// `{status: "ok", data}` wrapping.
    Envelope = 7,
    /// Renderer produces the response.
    Render = 8,
}

impl Stage {
    /// Returns true for stages that run before business logic.
    #[must_use]
    pub const fn is_pre_execute(self) -> bool {
        (self as u8) < (Self::Execute as u8)
    }

    /// Returns true for stages that run after business logic.
    #[must_use]
    pub const fn is_post_execute(self) -> bool {
        (self as u8) > (Self::Execute as u8)
    }

    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MethodCheck => "method_check",
            Self::SectionPermissionCheck => "section_permission_check",
            Self::QueryValidate => "query_validate",
            Self::BodyValidate => "body_validate",
            Self::Execute => "execute",
            Self::Serialize => "serialize",
            Self::Envelope => "envelope",
            Self::Render => "render",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Self; 8] {
        [
            Self::MethodCheck,
            Self::SectionPermissionCheck,
            Self::QueryValidate,
            Self::BodyValidate,
            Self::Execute,
            Self::Serialize,
            Self::Envelope,
            Self::Render,
        ]
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_ordering() {
        let stages = Stage::all();
        assert!(stages.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(stages[0], Stage::MethodCheck);
        assert_eq!(stages[7], Stage::Render);
    }

    #[test]
    fn test_stage_categories() {
        assert!(Stage::MethodCheck.is_pre_execute());
        assert!(Stage::BodyValidate.is_pre_execute());
        assert!(!Stage::Execute.is_pre_execute());
        assert!(!Stage::Execute.is_post_execute());
        assert!(Stage::Serialize.is_post_execute());
        assert!(Stage::Render.is_post_execute());
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::SectionPermissionCheck.name(), "section_permission_check");
        assert_eq!(Stage::QueryValidate.to_string(), "query_validate");
    }
}
