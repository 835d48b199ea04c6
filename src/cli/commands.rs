//! CLI command implementations.

use crate::config::EngineConfig;
use crate::engine::{
    remediation_targets, with_due_reviews, AdaptiveSession, GraphSummary, StateChange,
};
use crate::graph::{find_any_cycle, DomainGraph, MasteryGraph};
use crate::store::{
    load_or_init_mastery, DomainGraphStore, ItemSource, JsonFileStore, MasteryStore,
};
use crate::types::{now_micros, CatError, CatResult, ConceptMastery, LearnerProfile};

/// Items projected by the ability forecast after a run.
const FORECAST_HORIZON: usize = 5;

/// Shared state for every command.
pub struct CommandContext {
    pub store: JsonFileStore,
    pub config: EngineConfig,
    pub json: bool,
}

impl CommandContext {
    fn domain(&self) -> CatResult<DomainGraph> {
        Ok(self.store.load_domain_graph()?.unwrap_or_default())
    }

    fn mastery(&self, learner_id: &str, domain: &DomainGraph) -> CatResult<MasteryGraph> {
        load_or_init_mastery(&self.store, learner_id, Some(domain))
    }
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

/// Summarize the domain graph, optionally with one learner's mastery.
pub fn cmd_info(ctx: &CommandContext, learner_id: Option<&str>, recent: usize) -> CatResult<()> {
    let domain = ctx.domain()?;
    let mastery = match learner_id {
        Some(id) => Some(ctx.mastery(id, &domain)?),
        None => None,
    };
    let summary = GraphSummary::build(&domain, mastery.as_ref(), recent, now_micros());

    if ctx.json {
        print_json(&serde_json::to_value(&summary)?);
    } else {
        println!("Data dir: {}", ctx.store.root().display());
        println!("Nodes: {}", summary.node_count);
        println!("Edges: {}", summary.edge_count);
        println!("Node types:");
        for (kind, count) in &summary.node_types {
            println!("  {}: {}", kind, count);
        }
        println!("Edge types:");
        for (kind, count) in &summary.edge_types {
            println!("  {}: {}", kind, count);
        }
        if let Some(id) = learner_id {
            println!("Mastery for {}:", id);
            for (state, count) in &summary.mastery_states {
                println!("  {}: {}", state, count);
            }
            println!("Reviews due: {}", summary.review_due_count);
            if let Some(at) = summary.next_review_at {
                println!("Next review: {}", format_timestamp(at));
            }
            if !summary.recent.is_empty() {
                println!("Recently attempted:");
                for r in &summary.recent {
                    println!(
                        "  {} ({}) {} at {}",
                        r.title,
                        r.concept_id,
                        r.state,
                        format_timestamp(r.last_attempt_at)
                    );
                }
            }
        }
    }
    Ok(())
}

/// List prerequisites of a concept, optionally transitive or as remediation.
pub fn cmd_prereqs(
    ctx: &CommandContext,
    concept_id: &str,
    transitive: bool,
    learner_id: Option<&str>,
) -> CatResult<()> {
    let domain = ctx.domain()?;
    if !domain.contains(concept_id) {
        return Err(CatError::NodeNotFound(concept_id.to_string()));
    }

    if let Some(learner_id) = learner_id {
        let mastery = ctx.mastery(learner_id, &domain)?;
        let targets = remediation_targets(&domain, &mastery, concept_id)?;
        if ctx.json {
            print_json(&serde_json::json!({
                "concept": concept_id,
                "learner": learner_id,
                "remediation": targets,
            }));
        } else if targets.is_empty() {
            println!("{}: all prerequisites functional", concept_id);
        } else {
            println!("Remediate before {}:", concept_id);
            for t in &targets {
                println!(
                    "  {} ({}) {} risk={:.2} depth={}",
                    t.title, t.concept_id, t.state, t.decay_risk, t.distance
                );
            }
        }
        return Ok(());
    }

    let ids: Vec<String> = if transitive {
        domain.prerequisite_closure(concept_id)?
    } else {
        domain
            .prerequisites(concept_id)
            .into_iter()
            .map(|n| n.id.clone())
            .collect()
    };

    if ctx.json {
        print_json(&serde_json::json!({
            "concept": concept_id,
            "transitive": transitive,
            "prerequisites": ids,
        }));
    } else if ids.is_empty() {
        println!("{} has no prerequisites", concept_id);
    } else {
        println!("Prerequisites of {}:", concept_id);
        for id in &ids {
            let title = domain.get(id).map(|n| n.title.as_str()).unwrap_or("");
            println!("  {} {}", id, title);
        }
    }
    Ok(())
}

/// Check for dependency cycles, from one node or the whole graph.
///
/// Returns whether a cycle was found.
pub fn cmd_cycles(ctx: &CommandContext, start_id: Option<&str>) -> CatResult<bool> {
    let domain = ctx.domain()?;
    let cycle = match start_id {
        Some(id) => {
            if !domain.contains(id) {
                return Err(CatError::NodeNotFound(id.to_string()));
            }
            domain.find_cycle(id)
        }
        None => find_any_cycle(&domain),
    };

    if ctx.json {
        print_json(&serde_json::json!({
            "start": start_id,
            "has_cycle": cycle.is_some(),
            "cycle": cycle,
        }));
    } else {
        match &cycle {
            Some(path) => println!("Cycle: {}", path.join(" -> ")),
            None => println!("No dependency cycles"),
        }
    }
    Ok(cycle.is_some())
}

/// Run an adaptive session from a scripted answer sequence.
///
/// `answers` is consumed one entry per administered item; the session stops
/// early when the script runs out. With a topic, items for concepts due for
/// review are added from the whole bank. Evidence is applied to the learner's
/// mastery, which is then saved.
pub fn cmd_run(
    ctx: &mut CommandContext,
    learner_id: &str,
    topic: Option<&str>,
    answers: &[bool],
) -> CatResult<()> {
    let now = now_micros();
    let domain = ctx.domain()?;
    let mut mastery = ctx.mastery(learner_id, &domain)?;

    let mut items = ctx.store.get_items(topic)?;
    if topic.is_some() {
        let bank = ctx.store.get_items(None)?;
        items = with_due_reviews(items, &bank, &mastery, now);
    }

    let learner = LearnerProfile::new(learner_id, learner_id, topic.map(str::to_string))?;
    let session_id = format!("{}-{}", learner_id, now);
    let mut session = AdaptiveSession::new(session_id, learner, items, ctx.config.termination)?
        .with_initial_ability(ctx.config.prior.estimate());

    let mut script = answers.iter();
    while session.advance_to_next_item().is_some() {
        let Some(&correct) = script.next() else {
            log::info!("answer script exhausted before termination");
            break;
        };
        session.record_response(correct, 0, if correct { "correct" } else { "incorrect" })?;
    }

    let changes: Vec<StateChange> = mastery.apply_all(&session.evidence());
    ctx.store.save_mastery(&mastery)?;

    let report = session.report();
    let forecast = session.forecast(FORECAST_HORIZON);
    if ctx.json {
        print_json(&serde_json::json!({
            "report": report,
            "state_changes": changes,
            "forecast": forecast,
        }));
    } else {
        println!("Session {}", report.session_id);
        println!("  Items: {}", report.items_administered);
        println!("  Correct: {}", report.correct_count);
        println!(
            "  Theta: {:.3} (se {:.3})",
            report.final_ability.theta, report.final_ability.standard_error
        );
        match report.termination {
            Some(reason) => println!("  Stopped: {}", reason),
            None => println!("  Stopped: script exhausted"),
        }
        for change in &changes {
            println!(
                "  {}: {} -> {}",
                change.concept_id, change.from, change.to
            );
        }
        println!("  Forecast (p={:.2}):", forecast.prob_correct);
        for point in &forecast.points {
            println!(
                "    +{} items: {:.3} [{:.3}, {:.3}]",
                point.step, point.expected_theta, point.lower_theta, point.upper_theta
            );
        }
    }
    Ok(())
}

/// Apply time-based decay to a learner's mastery and save it.
pub fn cmd_decay(
    ctx: &mut CommandContext,
    learner_id: &str,
    window_days: Option<f64>,
    now: Option<u64>,
) -> CatResult<()> {
    let window = window_days.unwrap_or(ctx.config.decay_window_days);
    let now = now.unwrap_or_else(now_micros);

    let domain = ctx.domain()?;
    let mut mastery = ctx.mastery(learner_id, &domain)?;
    let report = mastery.apply_decay(window, now)?;
    ctx.store.save_mastery(&mastery)?;

    if ctx.json {
        print_json(&serde_json::to_value(&report)?);
    } else {
        println!("Decay complete:");
        println!("  Concepts updated: {}", report.concepts_decayed);
        println!("  Regressed: {}", report.regressed.len());
        for (id, from, to) in &report.regressed {
            println!("    {}: {} -> {}", id, from, to);
        }
    }
    Ok(())
}

/// Show the weakest concepts for a learner.
pub fn cmd_weakest(ctx: &CommandContext, learner_id: &str, limit: usize) -> CatResult<()> {
    let domain = ctx.domain()?;
    let mastery = ctx.mastery(learner_id, &domain)?;
    print_concepts(ctx, &domain, "Weakest concepts", &mastery.weakest(limit))
}

/// Show concepts due for review.
pub fn cmd_due(ctx: &CommandContext, learner_id: &str, now: Option<u64>) -> CatResult<()> {
    let now = now.unwrap_or_else(now_micros);
    let domain = ctx.domain()?;
    let mastery = ctx.mastery(learner_id, &domain)?;
    print_concepts(ctx, &domain, "Due for review", &mastery.due_for_review(now))?;
    if !ctx.json {
        if let Some(at) = mastery.next_review_after(now) {
            println!("Next review: {}", format_timestamp(at));
        }
    }
    Ok(())
}

/// Show concepts whose decay risk crossed a threshold.
pub fn cmd_at_risk(
    ctx: &CommandContext,
    learner_id: &str,
    threshold: Option<f64>,
) -> CatResult<()> {
    let threshold = threshold.unwrap_or(ctx.config.at_risk_threshold);
    let domain = ctx.domain()?;
    let mastery = ctx.mastery(learner_id, &domain)?;
    print_concepts(
        ctx,
        &domain,
        &format!("At risk (>= {:.2})", threshold),
        &mastery.at_risk(threshold),
    )
}

fn print_concepts(
    ctx: &CommandContext,
    domain: &DomainGraph,
    heading: &str,
    concepts: &[&ConceptMastery],
) -> CatResult<()> {
    if ctx.json {
        print_json(&serde_json::to_value(concepts)?);
        return Ok(());
    }
    println!("{}:", heading);
    if concepts.is_empty() {
        println!("  (none)");
    }
    for m in concepts {
        let title = domain
            .get(&m.concept_id)
            .map(|n| n.title.as_str())
            .unwrap_or(m.concept_id.as_str());
        println!(
            "  {} ({}) {} strength={:.2} risk={:.2}",
            title, m.concept_id, m.state, m.evidence_strength, m.decay_risk
        );
        if !m.top_error_types.is_empty() {
            println!("    errors: {}", m.top_error_types.join(", "));
        }
    }
    Ok(())
}

/// Parse a script like `1,0,c,i,true` into answers.
pub fn parse_answers(raw: &str) -> CatResult<Vec<bool>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|token| match token.to_lowercase().as_str() {
            "1" | "c" | "y" | "true" | "correct" => Ok(true),
            "0" | "i" | "n" | "false" | "incorrect" => Ok(false),
            other => Err(CatError::Config(format!("invalid answer token: {other}"))),
        })
        .collect()
}

fn format_timestamp(micros: u64) -> String {
    let secs = (micros / 1_000_000) as i64;
    let dt = chrono::DateTime::from_timestamp(secs, 0);
    match dt {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("{} us", micros),
    }
}
