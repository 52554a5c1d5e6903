//! Command handlers: resolve ids, call one service, print the outcome.

use crate::cli::{
    AggregateArgs, CommentArgs, Command, EvaluationCommand, EvaluationShowArgs, OutputArgs,
    PreviewArgs, ProposalCommand, ReviewerArg, ReviewerCommand, ScoreArgs,
};
use crate::error::CliError;
use evalboard_core::scoring::{grade_scores, Exclusion};
use evalboard_core::service::ResultRow;
use evalboard_core::{
    CriterionId, EngineConfig, Evaluation, EvaluationService, GradeLevel, Proposal,
    ResultsService, Reviewer, RosterService, SaveEvaluationRequest, SqliteStore,
};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

struct Services<'conn> {
    roster: RosterService<SqliteStore<'conn>>,
    evaluations: EvaluationService<SqliteStore<'conn>>,
    results: ResultsService<SqliteStore<'conn>>,
}

pub(crate) fn dispatch(
    command: Command,
    store: SqliteStore<'_>,
    config: &EngineConfig,
) -> Result<(), CliError> {
    let services = Services {
        roster: RosterService::new(store).with_retry_attempts(config.storage_retry_attempts),
        evaluations: EvaluationService::new(store)
            .with_retry_attempts(config.storage_retry_attempts),
        results: ResultsService::new(store, config.policy),
    };

    match command {
        Command::Init => init(&services, config),
        Command::Rubric => rubric(&services),
        Command::Proposal { command } => proposal(&services, command),
        Command::Reviewer { command } => reviewer(&services, command),
        Command::Score(args) => score(&services, args),
        Command::Comment(args) => comment(&services, args),
        Command::Submit(args) => submit(&services, args),
        Command::Unlock(args) => unlock(&services, args),
        Command::Evaluation {
            command: EvaluationCommand::Show(args),
        } => evaluation_show(&services, args),
        Command::Evaluation {
            command: EvaluationCommand::Preview(args),
        } => evaluation_preview(&services, args),
        Command::Aggregate(args) => aggregate(&services, args),
        Command::Results(args) => results(&services, args),
        Command::Progress(args) => progress(&services, args),
        Command::Status(args) => status(&services, args),
        Command::Reset { confirm } => reset(&services, confirm),
    }
}

fn init(services: &Services<'_>, config: &EngineConfig) -> Result<(), CliError> {
    let inserted = services.roster.install_default_rubric()?;
    if inserted == 0 {
        println!("database ready at {}; rubric already installed", config.db_path.display());
    } else {
        println!(
            "database ready at {}; installed {inserted} criteria",
            config.db_path.display()
        );
    }
    Ok(())
}

fn rubric(services: &Services<'_>) -> Result<(), CliError> {
    let criteria = services.roster.list_criteria()?;
    if criteria.is_empty() {
        println!("no rubric installed; run `evalboard init`");
        return Ok(());
    }

    let mut category = "";
    let mut total = 0.0;
    for criterion in &criteria {
        if criterion.category != category {
            category = criterion.category.as_str();
            println!("\n{category}");
        }
        let row = grade_scores(criterion.max_score)?
            .iter()
            .map(|(grade, score)| format!("{}={score:.1}", grade.label()))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "  {:<6} {:>4.1}  {}  [{row}]",
            criterion.id, criterion.max_score, criterion.name
        );
        total += criterion.max_score;
    }
    println!("\n{} criteria, {total:.1} points", criteria.len());
    Ok(())
}

fn proposal(services: &Services<'_>, command: ProposalCommand) -> Result<(), CliError> {
    let roster = &services.roster;
    match command {
        ProposalCommand::Add { name, order } => {
            let proposal = roster.add_proposal(&name, order)?;
            println!("added #{} {} ({})", proposal.order_num, proposal.name, proposal.id);
        }
        ProposalCommand::List => {
            for proposal in roster.list_proposals()? {
                println!("#{:<3} {}  {}", proposal.order_num, proposal.id, proposal.name);
            }
        }
        ProposalCommand::Rename {
            proposal,
            name,
            order,
        } => {
            let target = resolve_proposal(services, &proposal)?;
            let mut updated = roster.rename_proposal(target.id, &name)?;
            if let Some(order) = order {
                updated = roster.reorder_proposal(target.id, order)?;
            }
            println!("proposal #{} is now {}", updated.order_num, updated.name);
        }
        ProposalCommand::Delete { proposal } => {
            let target = resolve_proposal(services, &proposal)?;
            roster.delete_proposal(target.id)?;
            println!("deleted {} with all of its scores", target.name);
        }
    }
    Ok(())
}

fn reviewer(services: &Services<'_>, command: ReviewerCommand) -> Result<(), CliError> {
    let roster = &services.roster;
    match command {
        ReviewerCommand::Login { name } => {
            let login = roster.login_reviewer(&name)?;
            let verb = if login.created { "registered" } else { "welcome back" };
            println!("{verb}: {} ({})", login.reviewer.name, login.reviewer.id);
        }
        ReviewerCommand::List => {
            for reviewer in roster.list_reviewers()? {
                let state = services.evaluations.submission_state(reviewer.id)?;
                println!("{}  {:<12} {}", reviewer.id, state.as_str(), reviewer.name);
            }
        }
        ReviewerCommand::Rename { reviewer, name } => {
            let target = resolve_reviewer(services, &reviewer)?;
            let renamed = roster.rename_reviewer(target.id, &name)?;
            println!("renamed {} to {}", target.name, renamed.name);
        }
        ReviewerCommand::Delete { reviewer } => {
            let target = resolve_reviewer(services, &reviewer)?;
            roster.delete_reviewer(target.id)?;
            println!("deleted {} with all of their scores", target.name);
        }
    }
    Ok(())
}

fn score(services: &Services<'_>, args: ScoreArgs) -> Result<(), CliError> {
    let reviewer = resolve_reviewer(services, &args.reviewer)?;
    let proposal = resolve_proposal(services, &args.proposal)?;

    let mut grades = parse_grades(&args.grades)?;
    if let Some(fill) = args.fill.as_deref() {
        let grade = GradeLevel::parse(fill)?;
        for criterion in services.roster.list_criteria()? {
            grades.entry(criterion.id).or_insert(grade);
        }
    }

    let evaluation = services.evaluations.save_evaluation(&SaveEvaluationRequest {
        reviewer_id: reviewer.id,
        proposal_id: proposal.id,
        grades,
        comment: args.comment,
    })?;
    println!(
        "saved {} for {}: total {:.1} over {} criteria",
        proposal.name,
        reviewer.name,
        evaluation.total_score,
        evaluation.scores.len()
    );
    Ok(())
}

fn evaluation_show(services: &Services<'_>, args: EvaluationShowArgs) -> Result<(), CliError> {
    let reviewer = resolve_reviewer(services, &args.reviewer)?;
    let proposal = resolve_proposal(services, &args.proposal)?;
    let evaluation = services
        .evaluations
        .get_evaluation(reviewer.id, proposal.id)?
        .ok_or_else(|| {
            CliError::Usage(format!(
                "{} has not scored {} yet",
                reviewer.name, proposal.name
            ))
        })?;

    if args.output.json {
        #[derive(Serialize)]
        struct EvaluationView<'a> {
            reviewer: &'a str,
            proposal: &'a str,
            grades: BTreeMap<CriterionId, GradeLevel>,
            evaluation: &'a Evaluation,
        }
        return print_json(&EvaluationView {
            reviewer: &reviewer.name,
            proposal: &proposal.name,
            grades: evaluation.grade_map(),
            evaluation: &evaluation,
        });
    }

    println!("{} on {}", reviewer.name, proposal.name);
    for score in &evaluation.scores {
        println!(
            "  {:<6} {} ({})  {:>5.1}",
            score.criterion_id,
            score.grade.label(),
            score.grade.level(),
            score.value
        );
    }
    println!("total {:.1}", evaluation.total_score);
    if !evaluation.comment.is_empty() {
        println!("comment: {}", evaluation.comment);
    }
    Ok(())
}

fn evaluation_preview(services: &Services<'_>, args: PreviewArgs) -> Result<(), CliError> {
    let grades = parse_grades(&args.grades)?;
    let preview = services.evaluations.preview_total(&grades)?;
    if args.output.json {
        return print_json(&preview);
    }

    for category in &preview.categories {
        println!(
            "  {:<32} {:>5.1} / {:<5.1} {}/{} graded",
            category.category, category.score, category.max_score, category.graded, category.total
        );
    }
    let marker = if preview.complete { "complete" } else { "partial" };
    println!(
        "total {:.1} ({}/{} criteria, {marker})",
        preview.total, preview.scored, preview.required
    );
    Ok(())
}

fn aggregate(services: &Services<'_>, args: AggregateArgs) -> Result<(), CliError> {
    let proposal = resolve_proposal(services, &args.proposal)?;
    let result = services.results.aggregate_proposal(proposal.id)?;
    if args.output.json {
        return print_json(&result);
    }

    let aggregate = &result.aggregate;
    println!("{}", result.proposal.name);
    for entry in &aggregate.entries {
        let flag = match entry.exclusion {
            Some(Exclusion::High) => "excluded (high)",
            Some(Exclusion::Low) => "excluded (low)",
            None => "",
        };
        println!(
            "  {:<24} {:>6.1}  {flag}",
            entry.key.reviewer_name, entry.total
        );
    }
    if aggregate.is_unscored() {
        println!("no evaluations yet");
    } else {
        println!(
            "raw mean {:.2}, trimmed mean {:.2} over {} of {} totals",
            aggregate.raw_mean,
            aggregate.trimmed_mean,
            aggregate.trimmed_count(),
            aggregate.entries.len()
        );
    }
    Ok(())
}

fn comment(services: &Services<'_>, args: CommentArgs) -> Result<(), CliError> {
    let reviewer = resolve_reviewer(services, &args.reviewer)?;
    let proposal = resolve_proposal(services, &args.proposal)?;
    services
        .evaluations
        .update_comment(reviewer.id, proposal.id, &args.comment)?;
    println!("comment updated for {} on {}", reviewer.name, proposal.name);
    Ok(())
}

fn submit(services: &Services<'_>, args: ReviewerArg) -> Result<(), CliError> {
    let reviewer = resolve_reviewer(services, &args.reviewer)?;
    services.evaluations.submit(reviewer.id)?;
    println!("{} submitted; scores are now locked", reviewer.name);
    Ok(())
}

fn unlock(services: &Services<'_>, args: ReviewerArg) -> Result<(), CliError> {
    let reviewer = resolve_reviewer(services, &args.reviewer)?;
    let state = services.evaluations.unlock(reviewer.id)?;
    println!("{} unlocked ({})", reviewer.name, state.as_str());
    Ok(())
}

fn results(services: &Services<'_>, args: OutputArgs) -> Result<(), CliError> {
    let rows = services.results.results_board()?;
    if args.json {
        return print_json(&rows);
    }

    let policy = services.results.policy();
    println!(
        "ranking={} mean_rounding={}",
        policy.ranking.as_str(),
        policy.mean_rounding.as_str()
    );
    println!(
        "{:>4}  {:<32} {:>9} {:>9} {:>9}  excluded",
        "rank", "proposal", "reviewers", "trimmed", "raw"
    );
    for row in &rows {
        println!(
            "{:>4}  {:<32} {:>9} {:>9} {:>9}  {}",
            row.rank,
            row.proposal.name,
            row.reviewer_count,
            format_mean(row, row.trimmed_mean),
            format_mean(row, row.raw_mean),
            format_exclusions(row)
        );
    }
    Ok(())
}

fn progress(services: &Services<'_>, args: OutputArgs) -> Result<(), CliError> {
    let overview = services.results.progress_overview()?;
    if args.json {
        return print_json(&overview);
    }

    println!("reviewers");
    for entry in &overview.reviewers {
        println!(
            "  {:<24} {:>3}/{:<3} {:>4.0}%  {}",
            entry.reviewer.name,
            entry.scored,
            entry.required,
            entry.completion_percent,
            entry.state.as_str()
        );
    }
    println!("proposals");
    for entry in &overview.proposals {
        println!(
            "  #{:<3} {:<32} {} reviewer(s)",
            entry.proposal.order_num, entry.proposal.name, entry.reviewer_count
        );
    }
    Ok(())
}

fn status(services: &Services<'_>, args: OutputArgs) -> Result<(), CliError> {
    let counts = services.roster.data_status()?;
    if args.json {
        return print_json(&counts);
    }
    println!("proposals    {}", counts.proposals);
    println!("criteria     {}", counts.criteria);
    println!("reviewers    {}", counts.reviewers);
    println!("evaluations  {}", counts.evaluations);
    println!("scores       {}", counts.scores);
    Ok(())
}

fn reset(services: &Services<'_>, confirm: bool) -> Result<(), CliError> {
    if !confirm {
        return Err(CliError::Usage(
            "reset deletes every score, evaluation and reviewer; pass --confirm".to_string(),
        ));
    }
    let summary = services.roster.reset_evaluations()?;
    info!("event=cli_reset module=cli status=ok");
    println!(
        "removed {} reviewers, {} evaluations, {} scores",
        summary.reviewers, summary.evaluations, summary.scores
    );
    Ok(())
}

fn resolve_proposal(services: &Services<'_>, reference: &str) -> Result<Proposal, CliError> {
    let proposals = services.roster.list_proposals()?;
    let found = match Uuid::parse_str(reference.trim()) {
        Ok(id) => proposals.into_iter().find(|proposal| proposal.id == id),
        Err(_) => proposals
            .into_iter()
            .find(|proposal| proposal.name == reference.trim()),
    };
    found.ok_or_else(|| CliError::Usage(format!("unknown proposal `{reference}`")))
}

fn resolve_reviewer(services: &Services<'_>, reference: &str) -> Result<Reviewer, CliError> {
    let found = match Uuid::parse_str(reference.trim()) {
        Ok(id) => services
            .roster
            .list_reviewers()?
            .into_iter()
            .find(|reviewer| reviewer.id == id),
        Err(_) => services.roster.find_reviewer(reference)?,
    };
    found.ok_or_else(|| CliError::Usage(format!("unknown reviewer `{reference}`")))
}

fn parse_grades(pairs: &[String]) -> Result<BTreeMap<CriterionId, GradeLevel>, CliError> {
    let mut grades = BTreeMap::new();
    for pair in pairs {
        let (criterion_id, grade) = pair
            .split_once('=')
            .ok_or_else(|| CliError::Usage(format!("expected CRITERION=GRADE, got `{pair}`")))?;
        grades.insert(criterion_id.trim().to_string(), GradeLevel::parse(grade)?);
    }
    Ok(grades)
}

fn format_mean(row: &ResultRow, value: f64) -> String {
    if row.unscored {
        "-".to_string()
    } else {
        format!("{value:.2}")
    }
}

fn format_exclusions(row: &ResultRow) -> String {
    match (&row.excluded_high, &row.excluded_low) {
        (Some(high), Some(low)) => format!("high={} low={}", high.reviewer_name, low.reviewer_name),
        _ => "-".to_string(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
