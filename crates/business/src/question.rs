//! Player questions for the administrator
//!
//! Questions are not stored. They go to the structured log under the
//! `beans::questions` target and the player gets an acknowledgement.

use crate::error::BusinessResult;
use beans_core::validate_player_id;

/// Acknowledgement returned to the player
pub const QUESTION_ACK: &str = "Question sent to the administrator";

pub struct QuestionService;

impl QuestionService {
    pub fn send_question(player_id: &str, question: &str) -> BusinessResult<&'static str> {
        let player_id = validate_player_id(player_id)?;
        tracing::info!(target: "beans::questions", player_id, question, "player question");
        Ok(QUESTION_ACK)
    }
}
