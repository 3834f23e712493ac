//! `chefai ask`: Answer one question from the command line.

use crate::runtime::Runtime;
use chefai_core::dietary::DietaryRestrictionSet;
use chefai_core::history::HistoryRecord;
use chefai_core::session::Session;

pub async fn run(
    question: String,
    diet: Option<String>,
    trace: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = Runtime::load().await?;
    runtime.spawn_event_logger();

    runtime.history.append(HistoryRecord::new(&question)).await?;

    let restrictions = diet
        .as_deref()
        .map(DietaryRestrictionSet::parse_list)
        .unwrap_or_default();
    let mut session = Session::with_restrictions(restrictions);

    match runtime.agent.run(&question, &mut session).await {
        Ok(run) => {
            if trace {
                for invocation in &run.invocations {
                    let status = if invocation.success { "ok" } else { "failed" };
                    eprintln!(
                        "  [{}] {} {} ({}ms)",
                        status, invocation.tool, invocation.arguments, invocation.duration_ms
                    );
                }
                eprintln!("  {} step(s), model {}\n", run.steps, run.model);
            }
            println!("{}", run.answer);
            if !session.restrictions().is_empty() {
                eprintln!("\n(dietary restrictions: {})", session.restrictions());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            Err(e.into())
        }
    }
}
