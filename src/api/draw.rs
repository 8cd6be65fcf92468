use crate::config::AppConfig;
use crate::error::AppError;
use crate::workflows::lottery::export::{result_csv, result_xlsx, TemplateKind};
use crate::workflows::lottery::import::{ResidentImporter, SpotImporter};
use crate::workflows::lottery::{
    LotteryEngine, LotteryReport, LotterySession, ReservationPolicy, SpotCategory, SpotLayout,
    WinnerPolicy,
};
use clap::{Args, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum LayoutArg {
    Sections,
    Detailed,
}

impl From<LayoutArg> for SpotLayout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Sections => SpotLayout::Sections,
            LayoutArg::Detailed => SpotLayout::Detailed,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct DrawArgs {
    /// Resident spreadsheet (CSV or XLSX)
    #[arg(long)]
    pub(crate) residents: PathBuf,
    /// Spot spreadsheet (CSV or XLSX). Without it, spots are generated from --covered/--uncovered.
    #[arg(long)]
    pub(crate) spots: Option<PathBuf>,
    /// Force the spot spreadsheet layout instead of detecting it from the headers
    #[arg(long, value_enum)]
    pub(crate) layout: Option<LayoutArg>,
    /// Number of covered spots to generate (C01, C02, ...)
    #[arg(long)]
    pub(crate) covered: Option<usize>,
    /// Number of uncovered spots to generate (D01, D02, ...)
    #[arg(long)]
    pub(crate) uncovered: Option<usize>,
    /// Apartments entitled to a second spot, comma separated
    #[arg(long, value_delimiter = ',')]
    pub(crate) double_spots: Vec<String>,
    /// Seed the random generator for a reproducible draw
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Write the result to this path (.csv or .xlsx)
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
    /// Override APP_LOTTERY_WINNER_POLICY (exclusive or repeat)
    #[arg(long, value_parser = parse_winner_policy)]
    pub(crate) winner_policy: Option<WinnerPolicy>,
    /// Override APP_LOTTERY_RESERVATION_POLICY (cross_spot or per_spot)
    #[arg(long, value_parser = parse_reservation_policy)]
    pub(crate) reservation_policy: Option<ReservationPolicy>,
}

#[derive(Args, Debug)]
pub(crate) struct TemplateArgs {
    /// Template to write: residents, spots-sections or spots-detailed
    #[arg(value_parser = parse_template)]
    pub(crate) kind: TemplateKind,
    /// Output path (defaults to the template's file name in the current directory)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

fn parse_winner_policy(raw: &str) -> Result<WinnerPolicy, String> {
    WinnerPolicy::parse(raw).ok_or_else(|| format!("unknown winner policy '{raw}'"))
}

fn parse_reservation_policy(raw: &str) -> Result<ReservationPolicy, String> {
    ReservationPolicy::parse(raw).ok_or_else(|| format!("unknown reservation policy '{raw}'"))
}

fn parse_template(raw: &str) -> Result<TemplateKind, String> {
    TemplateKind::parse(raw).ok_or_else(|| {
        format!("unknown template '{raw}' (expected residents, spots-sections or spots-detailed)")
    })
}

pub(crate) fn run_draw(args: DrawArgs) -> Result<(), AppError> {
    let DrawArgs {
        residents,
        spots,
        layout,
        covered,
        uncovered,
        double_spots,
        seed,
        export,
        winner_policy,
        reservation_policy,
    } = args;

    let config = AppConfig::load()?;
    let engine = LotteryEngine::new(
        winner_policy.unwrap_or(config.lottery.winner_policy),
        reservation_policy.unwrap_or(config.lottery.reservation_policy),
    );

    let mut session = LotterySession::new();
    let resident_import = ResidentImporter::from_path(&residents)?;
    for warning in &resident_import.warnings {
        println!("Warning: {}", warning.message());
    }
    session.replace_residents(resident_import.residents);

    if !double_spots.is_empty() {
        let update = session.configure_double_spots(&double_spots);
        println!("Double spots enabled for {} apartment(s)", update.enabled);
        for apartment in &update.unknown {
            println!("Warning: apartment {apartment} has no resident on file");
        }
    }

    match spots {
        Some(path) => {
            let import = SpotImporter::from_path(&path, layout.map(SpotLayout::from))?;
            for skipped in &import.skipped {
                println!("Skipped spot row {}: {}", skipped.row, skipped.reason);
            }
            session.replace_spots(import);
        }
        None => {
            session.generate_spots(covered.unwrap_or(0), uncovered.unwrap_or(0));
        }
    }

    let result = match seed {
        Some(seed) => session.draw_with_rng(&engine, &mut StdRng::seed_from_u64(seed)),
        None => session.draw(&engine),
    };
    let report = LotteryReport::from_result(result);
    render_report(&report);

    if let Some(path) = export {
        write_export(&report, &path)?;
        println!("\nResult written to {}", path.display());
    }

    Ok(())
}

pub(crate) fn run_template(args: TemplateArgs) -> Result<(), AppError> {
    let bytes = args.kind.workbook()?;
    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(args.kind.file_name()));
    std::fs::write(&path, bytes)?;
    println!("Template written to {}", path.display());
    Ok(())
}

fn write_export(report: &LotteryReport, path: &Path) -> Result<(), AppError> {
    let is_xlsx = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("xlsx"));

    let bytes = if is_xlsx {
        result_xlsx(report)?
    } else {
        result_csv(report)?
    };
    std::fs::write(path, bytes)?;
    Ok(())
}

fn render_report(report: &LotteryReport) {
    println!("Parking lottery {}", report.lottery_id);
    println!("Drawn at {}", report.drawn_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!(
        "{} spot(s) drawn, {} without a resident",
        report.drawn, report.unassigned
    );

    for warning in &report.warnings {
        println!("Warning: {warning}");
    }

    for category in [SpotCategory::Covered, SpotCategory::Uncovered] {
        let views: Vec<_> = report.by_category(category).collect();
        if views.is_empty() {
            continue;
        }

        println!("\n{} spots", category.label());
        for view in views {
            let kind = view
                .kind_label
                .map(|label| format!(" [{label}]"))
                .unwrap_or_default();
            let apartment = if view.apartment.is_empty() {
                "-"
            } else {
                view.apartment.as_str()
            };
            let resident = view
                .resident_name
                .as_deref()
                .map(|name| format!(" ({name})"))
                .unwrap_or_default();
            println!(
                "- {} {}{}: {}{} | {}",
                view.section,
                view.spot_number,
                kind,
                apartment,
                resident,
                view.observation_label
            );
        }
    }
}
