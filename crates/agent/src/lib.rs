//! The ChefAI agent: instruction assembly and the reasoning loop.
//!
//! The loop follows a **Reason → Act → Observe** cycle:
//!
//! 1. **Assemble** the instruction set from the session's current dietary
//!    restrictions
//! 2. **Send** instructions, conversation so far and tool descriptors to the
//!    language model
//! 3. **If tool calls**: run them in order through the registry, append the
//!    observations, loop back to step 1
//! 4. **If text**: that is the answer
//!
//! The loop ends at a final answer, at the step budget, or at the request
//! deadline.

pub mod loop_runner;
pub mod prompt;

#[cfg(any(test, feature = "test-util"))]
pub mod test_helpers;

pub use loop_runner::{AgentLoop, AgentRun};
pub use prompt::{Instruction, InstructionSet, PromptAssembler};
