use crate::infra::InMemorySubmissionStore;
use clap::Args;
use dual_risk_rating::config::AppConfig;
use dual_risk_rating::error::AppError;
use dual_risk_rating::rating::{
    GradePreview, GradeScores, GradingRequest, LoanGradingService, LoanInput, LoanType,
    OverrideState, PropertyType, QualitativeFactor, Rating,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct GradeArgs {
    /// JSON file holding the loan draft and optional `override` block
    #[arg(long)]
    pub(crate) input: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Apply an analyst override to the sample loan before submitting it
    #[arg(long)]
    pub(crate) with_override: bool,
}

fn grading_service() -> Result<LoanGradingService<InMemorySubmissionStore>, AppError> {
    let config = AppConfig::load()?;
    let model = config.rating.load_model()?;
    Ok(LoanGradingService::new(
        Arc::new(InMemorySubmissionStore::default()),
        model,
    )?)
}

pub(crate) fn run_grade(args: GradeArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.input)?;
    let request: GradingRequest = serde_json::from_str(&raw)?;

    let service = grading_service()?;
    let preview = service.preview(&request)?;

    println!("Loan grade breakdown ({})", args.input.display());
    render_preview(&request, &preview);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = grading_service()?;
    let loan = sample_office_loan()?;

    let mut request = GradingRequest {
        loan,
        override_state: OverrideState::default(),
    };

    println!("Dual risk rating demo");
    let preview = service.preview(&request)?;
    render_preview(&request, &preview);

    if args.with_override {
        request.override_state.engage(&preview.computed);
        request.override_state.brg = Some(5.0);
        request.override_state.justification =
            Some("Sponsor liquidity below covenant at last test date".to_string());
        println!("\nAnalyst override engaged: BRG set to 5");
    }

    let receipt = service.submit(request)?;
    println!("\n{} ({})", receipt.message, receipt.loan_id);

    match service.fetch(&receipt.loan_id)? {
        Some(stored) => {
            let json = serde_json::to_string_pretty(&stored)?;
            println!("Stored submission:\n{json}");
        }
        None => println!("Stored submission not found"),
    }

    Ok(())
}

/// Office loan entered the way an analyst would: property type first, then metrics
/// and one rating per listed factor.
fn sample_office_loan() -> Result<LoanInput, AppError> {
    let mut loan = LoanInput::default();
    loan.select_property_type(PropertyType::Office);
    loan.loan_type = Some(LoanType::Permanent);
    loan.dscr = Some(1.6);
    loan.occupancy = Some(96.0);
    loan.ltv = Some(50.0);

    let ratings = [
        (QualitativeFactor::LeaseExpiration, 4),
        (QualitativeFactor::TenantRating, 3),
        (QualitativeFactor::NumberOfUnits, 4),
        (QualitativeFactor::CollateralValue, 4),
    ];
    for (factor, value) in ratings {
        loan.rate(factor, Rating::new(value).map_err(grading_error)?)
            .map_err(grading_error)?;
    }
    loan.record_metric(QualitativeFactor::TenantRating, "BBB")
        .map_err(grading_error)?;
    loan.record_metric(QualitativeFactor::NumberOfUnits, 12.0)
        .map_err(grading_error)?;

    Ok(loan)
}

fn grading_error(err: dual_risk_rating::rating::InputError) -> AppError {
    AppError::Grading(err.into())
}

fn render_preview(request: &GradingRequest, preview: &GradePreview) {
    let loan = &request.loan;
    println!(
        "Property type: {}",
        loan.property_type
            .map_or("not selected", PropertyType::label)
    );
    println!(
        "Loan type: {}",
        loan.loan_type.map_or("not selected", LoanType::label)
    );

    render_grade("BRG", preview.computed.brg, preview.final_brg);
    render_grade("FRG", preview.computed.frg, preview.final_frg);

    if preview.validation.is_valid {
        println!("Ready to submit");
    } else {
        println!("Not ready: {}", preview.validation.summary());
    }
}

fn render_grade(label: &str, scores: Option<GradeScores>, final_grade: Option<f64>) {
    match (scores, final_grade) {
        (Some(scores), Some(final_grade)) => println!(
            "{label}: quantitative {:.4}, adjustment {:+.2}, adjusted {:.4}, blended {}, final {}",
            scores.quantitative,
            scores.adjustment,
            scores.qualitative_adjusted,
            scores.blended,
            final_grade
        ),
        _ => println!("{label}: not computable yet"),
    }
}
