//! Dietary restriction tool: replaces the session's active restriction set.
//!
//! Tokens outside the vocabulary are dropped; blank input clears the set.
//! Input with no recognised token also leaves the set empty, but says so.
//! This is the only tool with a side effect on session state.

use async_trait::async_trait;
use chefai_core::dietary::DietaryRestrictionSet;
use chefai_core::error::ToolError;
use chefai_core::session::Session;
use chefai_core::tool::{Tool, ToolInput, ToolKind, ToolOutput};
use tracing::info;

pub struct SetDietaryRestrictionsTool;

#[async_trait]
impl Tool for SetDietaryRestrictionsTool {
    fn kind(&self) -> ToolKind {
        ToolKind::SetDietaryRestrictions
    }

    async fn execute(&self, input: ToolInput, session: &mut Session) -> Result<ToolOutput, ToolError> {
        let requested = input.kind();
        let ToolInput::SetDietaryRestrictions { restrictions } = input else {
            return Err(ToolError::InvalidArguments(format!(
                "set_dietary_restrictions cannot handle {:?} input",
                requested
            )));
        };

        let accepted = DietaryRestrictionSet::parse_list(&restrictions);
        info!(
            session = %session.id,
            requested = %restrictions,
            accepted = %accepted,
            "Dietary restrictions replaced"
        );
        session.replace_restrictions(accepted.clone());
        if accepted.is_empty() && !restrictions.trim().is_empty() {
            return Ok(ToolOutput::RestrictionsUnrecognised(restrictions));
        }
        Ok(ToolOutput::RestrictionsUpdated(accepted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chefai_core::dietary::DietaryRestriction;

    async fn set(session: &mut Session, text: &str) -> String {
        SetDietaryRestrictionsTool
            .execute(
                ToolInput::SetDietaryRestrictions {
                    restrictions: text.into(),
                },
                session,
            )
            .await
            .unwrap()
            .render()
    }

    #[tokio::test]
    async fn invalid_tokens_filtered_from_confirmation() {
        let mut session = Session::new();
        let message = set(&mut session, "vegan, made-up-diet, kosher").await;

        assert_eq!(message, "Successfully set dietary restrictions: vegan, kosher");
        assert_eq!(session.restrictions().len(), 2);
        assert!(!message.contains("made-up-diet"));
    }

    #[tokio::test]
    async fn second_call_overwrites() {
        let mut session = Session::new();
        set(&mut session, "vegan").await;
        set(&mut session, "halal").await;

        let active: Vec<_> = session.restrictions().iter().collect();
        assert_eq!(active, vec![DietaryRestriction::Halal]);
    }

    #[tokio::test]
    async fn blank_input_clears() {
        let mut session = Session::with_restrictions(DietaryRestrictionSet::parse_list("vegan"));
        let message = set(&mut session, "   ").await;

        assert_eq!(message, "Dietary restrictions cleared");
        assert!(session.restrictions().is_empty());
    }

    #[tokio::test]
    async fn only_unknown_tokens_reports_rejection() {
        let mut session = Session::with_restrictions(DietaryRestrictionSet::parse_list("vegan"));
        let message = set(&mut session, "paleo").await;

        assert_eq!(message, "No recognised dietary restrictions in 'paleo'; restrictions cleared");
        assert!(session.restrictions().is_empty());
    }

    #[tokio::test]
    async fn normalizes_case_and_whitespace() {
        let mut session = Session::new();
        let message = set(&mut session, "  GLUTEN-FREE ,Dairy-Free").await;
        assert_eq!(message, "Successfully set dietary restrictions: gluten-free, dairy-free");
    }
}
