use crate::infra::{
    parse_rating, InMemoryLeadRepository, InMemoryNotificationPublisher, InMemoryRosterRepository,
};
use clap::Args;
use dealer_crm::error::AppError;
use dealer_crm::workflows::leads::scoring::PILLARS;
use dealer_crm::workflows::leads::{
    BalancerConfig, CaptureChannel, LeadCapture, LeadDeskService, LeadRecord, PillarScorer,
    ProspectScore, RawRatings, RecommendationOutcome, SalespersonId, SalespersonLoad,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Pillar rating as PILLAR=RATING (repeatable, unrated pillars count as 0)
    #[arg(long = "rating", value_name = "ID=VALUE", value_parser = parse_rating)]
    pub(crate) ratings: Vec<(i64, i64)>,
    /// Print every pillar's contribution
    #[arg(long)]
    pub(crate) breakdown: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Maximum spread between busiest and least busy salesperson before a manual pick is flagged
    #[arg(long, default_value_t = 5)]
    pub(crate) imbalance_threshold: u32,
    /// Skip the scoring portion of the demo
    #[arg(long)]
    pub(crate) skip_scoring: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ratings: RawRatings = args.ratings.into_iter().collect();
    let score = PillarScorer::default().compute_score(&ratings)?;
    render_score(&score, args.breakdown);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        imbalance_threshold,
        skip_scoring,
    } = args;

    let notifications = Arc::new(InMemoryNotificationPublisher::default());
    let service = LeadDeskService::new(
        Arc::new(InMemoryLeadRepository::default()),
        Arc::new(InMemoryRosterRepository::default()),
        notifications.clone(),
        BalancerConfig {
            imbalance_threshold,
        },
    );

    println!("Lead desk demo (imbalance threshold {imbalance_threshold})");

    let early = service.capture(demo_capture("Early Caller", CaptureChannel::Phone, None))?;
    println!("\nBefore the roster is set");
    render_lead(&early);

    let overview = service.replace_roster(demo_roster())?;
    println!("\nGuard-duty roster");
    for member in &overview.members {
        println!(
            "  - {} ({}): {} leads / target {} ({}%){}",
            member.salesperson_id,
            member.name,
            member.current_load,
            member.daily_target,
            member.load_percentage,
            if member.on_duty { "" } else { " off duty" }
        );
    }
    if let RecommendationOutcome::Recommended(recommendation) = &overview.recommendation {
        println!(
            "  Spread {} -> {} (difference {}, average {:.1}); next lead goes to {}",
            recommendation.statistics.min,
            recommendation.statistics.max,
            recommendation.statistics.difference,
            recommendation.statistics.average,
            recommendation.recommended.salesperson_id
        );
    }

    println!("\nRetrying pending leads");
    for record in service.retry_pending(10)? {
        render_lead(&record);
    }

    println!("\nWalk-ins");
    let walk_in = service.capture(demo_capture("Sofia Martin", CaptureChannel::Showroom, None))?;
    render_lead(&walk_in);

    let requested = service.capture(demo_capture(
        "Returning Customer",
        CaptureChannel::Showroom,
        Some("julien"),
    ))?;
    render_lead(&requested);

    let confirmed = if requested.assignment.imbalance().is_some() {
        println!("  Manager confirms the override");
        let record = service.assign(
            &requested.lead.lead_id,
            SalespersonId::new("julien"),
            true,
        )?;
        render_lead(&record);
        record
    } else {
        requested
    };

    if !skip_scoring {
        println!("\nScoring {}", confirmed.lead.prospect_name);
        let rated = service.rate(&confirmed.lead.lead_id, &demo_ratings())?;
        if let Some(score) = &rated.score {
            render_score(score, false);
        }
    }

    let events = notifications.events();
    if events.is_empty() {
        println!("\nManager notifications: none");
    } else {
        println!("\nManager notifications");
        for event in events {
            println!("  - template={} -> {}", event.template, event.lead_id);
        }
    }

    Ok(())
}

fn render_lead(record: &LeadRecord) {
    let view = record.status_view();
    println!(
        "  - {} [{}] {} -> {}",
        view.lead_id,
        record.lead.channel.label(),
        record.lead.prospect_name,
        view.status
    );
    println!("    {}", view.assignment_rationale);
}

fn render_score(score: &ProspectScore, breakdown: bool) {
    println!("  Score: {}", score.summary());
    println!("  Next step: {}", score.tier.follow_up());
    if breakdown {
        for contribution in &score.contributions {
            println!(
                "    {:>2}. {:<28} {:>3} x {:>2}% = {:>5.2}",
                contribution.pillar_id,
                contribution.pillar_name,
                contribution.rating,
                contribution.weight,
                contribution.points
            );
        }
    }
}

fn demo_capture(name: &str, channel: CaptureChannel, requested: Option<&str>) -> LeadCapture {
    LeadCapture {
        channel,
        prospect_name: name.to_string(),
        contact: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        vehicle_interest: Some("Family SUV".to_string()),
        notes: None,
        requested_salesperson: requested.map(SalespersonId::new),
        force: false,
    }
}

fn demo_roster() -> Vec<SalespersonLoad> {
    [
        ("camille", "Camille", 6, 12, true),
        ("julien", "Julien", 14, 14, true),
        ("nora", "Nora", 9, 12, true),
        ("paul", "Paul", 2, 12, false),
    ]
    .into_iter()
    .map(
        |(id, name, current_load, daily_target, on_duty)| SalespersonLoad {
            salesperson_id: SalespersonId::new(id),
            name: name.to_string(),
            current_load,
            daily_target,
            on_duty,
        },
    )
    .collect()
}

fn demo_ratings() -> RawRatings {
    PILLARS
        .iter()
        .map(|pillar| {
            let rating = match pillar.id {
                2 | 3 | 13 => 90,
                8 | 12 => 60,
                _ => 75,
            };
            (i64::from(pillar.id), rating)
        })
        .collect()
}
