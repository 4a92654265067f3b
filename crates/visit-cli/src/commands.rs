use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use tracing::{info, info_span, warn};

use visit_core::{ReconcileOptions, reconcile, today};
use visit_ingest::{
    CancelToken, CsvRosterCache, ExportDirectory, FallbackRoster, LiveRoster, RosterLoader,
};
use visit_model::{InstrumentSchedule, ParticipantSummary, Roster};
use visit_report::{
    CollectionReport, MissingReport, MissingReportOptions, ReportCompleteness,
    assemble_collection_report, assemble_missing_report, assemble_summary, write_csv,
    write_missing_report_csv,
};

use crate::cli::{CollectionArgs, MissingArgs, RosterArgs};
use crate::config::{AppConfig, default_cache_path};

/// Roster settings after merging flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub study_id: String,
    pub exports: Option<PathBuf>,
    pub cache: PathBuf,
    pub concurrency: usize,
    pub as_of: NaiveDate,
}

impl RunSettings {
    pub fn resolve(args: &RosterArgs, config: &AppConfig) -> Result<Self> {
        let study_id = args
            .study
            .clone()
            .or_else(|| config.roster.study.clone())
            .filter(|study| !study.trim().is_empty())
            .ok_or_else(|| anyhow!("no study given; pass --study or set roster.study"))?;
        let cache = args
            .cache
            .clone()
            .or_else(|| config.roster.cache.clone())
            .unwrap_or_else(|| default_cache_path(&study_id));
        Ok(Self {
            study_id,
            exports: args.exports.clone().or_else(|| config.roster.exports.clone()),
            cache,
            concurrency: args.concurrency.unwrap_or(config.roster.concurrency),
            as_of: args.as_of.unwrap_or_else(today),
        })
    }
}

static INTERRUPT: OnceLock<CancelToken> = OnceLock::new();

/// Process-wide token cancelled by Ctrl-C. Live loads check it before each
/// subject.
pub fn interrupt_token() -> CancelToken {
    INTERRUPT.get_or_init(CancelToken::new).clone()
}

/// First Ctrl-C stops the live fetch and reports what was loaded; a second
/// one exits.
pub fn install_interrupt_handler() -> Result<()> {
    let token = interrupt_token();
    ctrlc::set_handler(move || {
        if token.is_cancelled() {
            std::process::exit(130);
        }
        warn!("interrupted, reporting the participants fetched so far");
        token.cancel();
    })
    .context("install interrupt handler")
}

/// Pick the roster provider: exports first with the cache as fallback, or the
/// cache alone when no usable export directory is configured.
pub fn roster_loader(
    settings: &RunSettings,
    schedule: &InstrumentSchedule,
) -> Box<dyn RosterLoader> {
    let cache = CsvRosterCache::new(&settings.cache).with_schedule(schedule.clone());
    let Some(exports) = &settings.exports else {
        return Box::new(cache);
    };
    match ExportDirectory::open(exports) {
        Ok(source) => {
            let live = LiveRoster::new(source, schedule.clone())
                .with_cache_path(&settings.cache)
                .with_concurrency(settings.concurrency)
                .with_as_of(settings.as_of)
                .with_cancel_token(interrupt_token());
            Box::new(FallbackRoster::new(live, cache))
        }
        Err(error) => {
            warn!(path = %exports.display(), %error, "export directory unusable, reading cache");
            Box::new(cache)
        }
    }
}

pub fn load_roster(settings: &RunSettings, schedule: &InstrumentSchedule) -> Result<Roster> {
    let roster = roster_loader(settings, schedule)
        .load_roster(&settings.study_id)
        .with_context(|| format!("load roster for study {}", settings.study_id))?;
    if roster.outcome.is_partial() {
        warn!(
            failed = roster.outcome.failures.len(),
            cancelled = roster.outcome.cancelled,
            "roster is incomplete, reporting what was loaded"
        );
    }
    Ok(roster)
}

#[derive(Debug)]
pub struct MissingRun {
    pub study_id: String,
    pub report: MissingReport,
    pub completeness: ReportCompleteness,
    pub output: Option<PathBuf>,
}

pub fn run_missing(args: &MissingArgs, config: &AppConfig) -> Result<MissingRun> {
    let settings = RunSettings::resolve(&args.roster, config)?;
    let span = info_span!("missing", study_id = %settings.study_id);
    let _guard = span.enter();

    let schedule = config.schedule().context("build schedule")?;
    let roster = load_roster(&settings, &schedule)?;
    let mut options = ReconcileOptions::new(settings.as_of);
    if args.strict {
        options = options.strict();
    }
    let reconciliation = reconcile(&roster, &schedule, &options).context("reconcile roster")?;

    let mut report_options = MissingReportOptions::default()
        .omit(config.report.omit.iter().cloned())
        .omit(args.omit.iter().cloned());
    if args.clamp || config.report.clamp {
        report_options = report_options.clamped();
    }
    let report = assemble_missing_report(&reconciliation, &report_options);
    if let Some(path) = &args.output {
        write_missing_report_csv(&report, path).context("write missing-data report")?;
    }
    let completeness = ReportCompleteness::new(&roster, &reconciliation);
    info!(%completeness, "missing-data report ready");

    Ok(MissingRun {
        study_id: settings.study_id,
        report,
        completeness,
        output: args.output.clone(),
    })
}

pub fn run_participants(args: &RosterArgs, config: &AppConfig) -> Result<ParticipantSummary> {
    let settings = RunSettings::resolve(args, config)?;
    let schedule = config.schedule().context("build schedule")?;
    let roster = load_roster(&settings, &schedule)?;
    Ok(assemble_summary(&roster))
}

pub fn run_collection(args: &CollectionArgs, config: &AppConfig) -> Result<CollectionReport> {
    let settings = RunSettings::resolve(&args.roster, config)?;
    let schedule = config.schedule().context("build schedule")?;
    let roster = load_roster(&settings, &schedule)?;
    let report = assemble_collection_report(&roster, &schedule, settings.as_of);
    if let Some(path) = &args.output {
        write_csv(&report, path).context("write collection report")?;
        info!(path = %path.display(), "wrote collection report");
    }
    Ok(report)
}

pub fn run_instruments(config: &AppConfig) -> Result<InstrumentSchedule> {
    config.schedule().context("build schedule")
}
