use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::color::{coolwarm, viridis};
use crate::config::PipelineConfig;
use crate::data::aggregate::{counts_by_year, source_column, top_n, value_counts};
use crate::data::clean::{clean, CleanReport, PUB_YEAR};
use crate::data::loader::{ensure_exists, load_file};
use crate::data::model::Table;
use crate::data::profile::{
    self, describe, dtypes, null_counts, ColumnSummary, NullCount, IMPORTANT_COLUMNS,
};
use crate::render::charts::{horizontal_bar_chart, line_chart, ChartLabels, FigureSize};
use crate::render::wordcloud::{self, WordCloudOptions};
use crate::render::fonts;
use crate::text::stopwords::{load_stopwords, StopwordSource, Stopwords};
use crate::text::tokenize::word_frequencies;

pub const PAPERS_PER_YEAR_PNG: &str = "papers_per_year.png";
pub const TOP_JOURNALS_PNG: &str = "top_journals.png";
pub const WORDCLOUD_PNG: &str = "title_wordcloud.png";
pub const SOURCES_PNG: &str = "papers_by_source.png";
pub const SUMMARY_JSON: &str = "eda_summary.json";

/// Word frequencies kept in the report (the word cloud's own cap).
const REPORTED_WORDS: usize = 200;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Per-column facts of the cleaned table, for the viewer's profile table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub non_null: usize,
    pub dtype: String,
}

/// Aggregates computed from the cleaned table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    pub rows: usize,
    pub columns: Vec<ColumnInfo>,
    pub cleaning: CleanReport,
    pub papers_per_year: Vec<(i64, usize)>,
    pub top_journals: Vec<(String, usize)>,
    /// `None` when the table has no source column.
    pub sources: Option<Vec<(String, usize)>>,
    pub word_frequencies: Vec<(String, usize)>,
}

/// PNGs written by a run; `None` where a figure was skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Figures {
    pub papers_per_year: Option<PathBuf>,
    pub top_journals: Option<PathBuf>,
    pub wordcloud: Option<PathBuf>,
    pub sources: Option<PathBuf>,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub loaded_shape: (usize, usize),
    pub dtypes: Vec<(String, String)>,
    pub null_counts: Vec<NullCount>,
    pub describe: Vec<ColumnSummary>,
    pub stopwords: StopwordSource,
    pub analysis: Analysis,
    pub figures: Figures,
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Print the profiling sections to stdout.
fn print_profile(table: &Table, config: &PipelineConfig) -> Result<()> {
    println!("Dataset loaded with shape: {:?}\n", table.shape());
    println!("Initial head of data:");
    println!("{}\n", profile::head_table(table, config.head_rows)?);
    println!("Data types:");
    println!("{}\n", profile::render_dtypes(&dtypes(table))?);
    println!("Missing values in important columns:");
    println!("{}\n", profile::render_null_counts(&null_counts(table, &IMPORTANT_COLUMNS))?);
    println!("Basic statistics:");
    println!("{}\n", profile::render_describe(&describe(table))?);
    Ok(())
}

/// Clean the table in place and compute every aggregate the figures need.
pub fn analyze(table: &mut Table, config: &PipelineConfig, stopwords: &Stopwords) -> Result<Analysis> {
    let cleaning = clean(table, config.missing_threshold)?;

    let papers_per_year = table.column(PUB_YEAR).map(counts_by_year).unwrap_or_default();
    let top_journals = table
        .column("journal")
        .map(|c| top_n(&value_counts(c), config.top_journals))
        .unwrap_or_default();
    let sources = source_column(table).map(value_counts);
    let mut word_frequencies = table
        .column("title")
        .map(|c| word_frequencies(c, stopwords))
        .unwrap_or_default();
    word_frequencies.truncate(REPORTED_WORDS);

    let columns = table
        .columns()
        .iter()
        .map(|c| ColumnInfo {
            name: c.name.clone(),
            non_null: c.non_null_count(),
            dtype: c.dtype().to_string(),
        })
        .collect();

    Ok(Analysis {
        rows: table.n_rows(),
        columns,
        cleaning,
        papers_per_year,
        top_journals,
        sources,
        word_frequencies,
    })
}

/// Render the four figures into `config.output_dir`. Empty aggregates skip
/// their figure with a warning.
pub fn render_figures(analysis: &Analysis, config: &PipelineConfig) -> Result<Figures> {
    let out = &config.output_dir;
    let mut figures = Figures::default();

    // Visualization 1: papers by year
    if analysis.papers_per_year.is_empty() {
        log::warn!("No parsed publication years, skipping {PAPERS_PER_YEAR_PNG}");
    } else {
        let path = out.join(PAPERS_PER_YEAR_PNG);
        line_chart(
            &path,
            &analysis.papers_per_year,
            ChartLabels {
                title: "Number of Papers Published Per Year",
                x: "Year",
                y: "Number of Papers",
            },
            FigureSize::new(10.0, 6.0, config.dpi),
        )?;
        figures.papers_per_year = Some(saved(path));
    }

    // Visualization 2: top journals
    if analysis.top_journals.is_empty() {
        log::warn!("No journal values, skipping {TOP_JOURNALS_PNG}");
    } else {
        let path = out.join(TOP_JOURNALS_PNG);
        let title = top_journals_title(&analysis.top_journals);
        horizontal_bar_chart(
            &path,
            &analysis.top_journals,
            &viridis(analysis.top_journals.len()),
            ChartLabels {
                title: &title,
                x: "Number of Papers",
                y: "Journal",
            },
            FigureSize::new(12.0, 7.0, config.dpi),
        )?;
        figures.top_journals = Some(saved(path));
    }

    // Visualization 3: title word cloud
    if analysis.word_frequencies.is_empty() {
        log::warn!("No title words left after filtering, skipping {WORDCLOUD_PNG}");
    } else {
        let path = out.join(WORDCLOUD_PNG);
        let options = WordCloudOptions::default().scaled(config.scale());
        let placed = wordcloud::render(&path, &analysis.word_frequencies, &options)?;
        log::debug!("Placed {} of {} words", placed.len(), analysis.word_frequencies.len());
        figures.wordcloud = Some(saved(path));
    }

    // Visualization 4: papers by source
    match &analysis.sources {
        Some(sources) if !sources.is_empty() => {
            let path = out.join(SOURCES_PNG);
            horizontal_bar_chart(
                &path,
                sources,
                &coolwarm(sources.len()),
                ChartLabels {
                    title: "Distribution of Paper Counts by Source",
                    x: "Number of Papers",
                    y: "Source",
                },
                FigureSize::new(12.0, 7.0, config.dpi),
            )?;
            figures.sources = Some(saved(path));
        }
        Some(_) => log::warn!("Source column is empty, skipping {SOURCES_PNG}"),
        None => log::info!("No source column, skipping {SOURCES_PNG}"),
    }

    Ok(figures)
}

/// Chart title naming the number of bars actually drawn.
fn top_journals_title(top_journals: &[(String, usize)]) -> String {
    format!("Top {} Journals Publishing COVID-19 Research", top_journals.len())
}

fn saved(path: PathBuf) -> PathBuf {
    log::info!("Saved plot to {}", path.display());
    path
}

pub fn write_summary(report: &Report, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(SUMMARY_JSON);
    let json = serde_json::to_string_pretty(report).context("serialising summary")?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Entry-point
// ---------------------------------------------------------------------------

/// Load → profile → clean → aggregate → render → summarise.
pub fn run(config: &PipelineConfig) -> Result<Report> {
    config.validate()?;
    ensure_exists(&config.input)?;

    log::info!("Loading dataset {}", config.input.display());
    let mut table = load_file(&config.input)?;
    let loaded_shape = table.shape();
    print_profile(&table, config)?;

    let report_dtypes = dtypes(&table)
        .into_iter()
        .map(|(name, dtype)| (name, dtype.to_string()))
        .collect();
    let report_nulls = null_counts(&table, &IMPORTANT_COLUMNS);
    let report_describe = describe(&table);

    let stopwords = load_stopwords(&config.stopwords)?;
    let analysis = analyze(&mut table, config, &stopwords)?;
    println!("Data cleaned and prepared:");
    println!("{}\n", profile::info(&table)?);

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;
    fonts::register(config.font.as_deref())?;
    let figures = render_figures(&analysis, config)?;

    let report = Report {
        input: config.input.clone(),
        output_dir: config.output_dir.clone(),
        loaded_shape,
        dtypes: report_dtypes,
        null_counts: report_nulls,
        describe: report_describe,
        stopwords: stopwords.source().clone(),
        analysis,
        figures,
    };
    let summary = write_summary(&report, &config.output_dir)?;
    log::info!("Wrote summary to {}", summary.display());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};
    use tempfile::TempDir;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn metadata() -> Table {
        Table::from_columns(vec![
            Column::new("cord_uid", vec![s("a"), s("b"), s("c"), s("d")]),
            Column::new(
                "title",
                vec![s("Coronavirus vaccine trials"), s("Vaccine safety"), s("Masks"), CellValue::Null],
            ),
            Column::new(
                "publish_time",
                vec![s("2020-04-01"), s("2021"), s("2020 Jun"), s("2019")],
            ),
            Column::new("journal", vec![s("BMJ"), s("Lancet"), s("BMJ"), s("BMJ")]),
            Column::new("source_x", vec![s("PMC"), s("Medline"), s("PMC"), s("WHO")]),
            Column::new(
                "arxiv_id",
                vec![CellValue::Null, CellValue::Null, CellValue::Null, s("2004.1")],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_analyze_aggregates() {
        let mut table = metadata();
        let config = PipelineConfig::default();
        let analysis = analyze(&mut table, &config, &Stopwords::default()).unwrap();

        assert_eq!(analysis.rows, 3);
        assert_eq!(analysis.cleaning.dropped_columns, vec!["arxiv_id"]);
        assert_eq!(analysis.cleaning.dropped_rows, 1);
        assert_eq!(analysis.papers_per_year, vec![(2020, 2), (2021, 1)]);
        assert_eq!(
            analysis.top_journals,
            vec![("BMJ".to_string(), 2), ("Lancet".to_string(), 1)]
        );
        assert_eq!(
            analysis.sources,
            Some(vec![("PMC".to_string(), 2), ("Medline".to_string(), 1)])
        );
        assert_eq!(analysis.word_frequencies[0], ("vaccine".to_string(), 2));
        assert!(analysis.columns.iter().any(|c| c.name == "abstract_word_count"));
    }

    #[test]
    fn test_top_journals_limit() {
        let mut table = metadata();
        let config = PipelineConfig {
            top_journals: 1,
            ..Default::default()
        };
        let analysis = analyze(&mut table, &config, &Stopwords::default()).unwrap();
        assert_eq!(analysis.top_journals.len(), 1);
    }

    #[test]
    fn test_top_journals_title_counts_bars() {
        let mut table = metadata();
        let analysis = analyze(&mut table, &PipelineConfig::default(), &Stopwords::default()).unwrap();
        assert_eq!(
            top_journals_title(&analysis.top_journals),
            "Top 2 Journals Publishing COVID-19 Research"
        );
    }

    #[test]
    fn test_empty_aggregates_skip_figures() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let figures = render_figures(&Analysis::default(), &config).unwrap();
        assert_eq!(figures, Figures::default());
    }

    #[test]
    fn test_summary_json() {
        let dir = TempDir::new().unwrap();
        let mut table = metadata();
        let analysis =
            analyze(&mut table, &PipelineConfig::default(), &Stopwords::default()).unwrap();
        let report = Report {
            input: PathBuf::from("metadata.csv"),
            output_dir: dir.path().to_path_buf(),
            loaded_shape: (4, 6),
            dtypes: vec![],
            null_counts: vec![],
            describe: vec![],
            stopwords: StopwordSource::Default,
            analysis,
            figures: Figures::default(),
        };

        let path = write_summary(&report, dir.path()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["analysis"]["rows"], 3);
        assert_eq!(json["analysis"]["papers_per_year"][0][0], 2020);
        assert_eq!(json["stopwords"], "Default");
    }

    fn write_metadata_csv(path: &Path) {
        let journals = ["BMJ", "Lancet", "Cell"];
        let sources = ["PMC", "Medline"];
        let mut csv = String::from("cord_uid,source_x,title,abstract,publish_time,journal\n");
        for i in 0..30 {
            csv.push_str(&format!(
                "id{i},{},Coronavirus vaccine trial number {i},Short abstract text,{}-03-01,{}\n",
                sources[i % 2],
                2019 + i % 3,
                journals[i % 3],
            ));
        }
        std::fs::write(path, csv).unwrap();
    }

    #[test]
    fn test_run_writes_all_figures() {
        if fonts::register(None).is_err() {
            eprintln!("no system TrueType font found, skipping figure rendering");
            return;
        }
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("metadata.csv");
        write_metadata_csv(&input);
        let config = PipelineConfig {
            input,
            stopwords: dir.path().join("absent_stopwords.txt"),
            output_dir: dir.path().join("out"),
            dpi: 100,
            ..Default::default()
        };

        let report = run(&config).unwrap();
        assert_eq!(report.analysis.rows, 30);
        assert_eq!(report.analysis.top_journals.len(), 3);

        let expected = [
            (report.figures.papers_per_year.as_ref(), (1000, 600)),
            (report.figures.top_journals.as_ref(), (1200, 700)),
            (report.figures.wordcloud.as_ref(), (800, 400)),
            (report.figures.sources.as_ref(), (1200, 700)),
        ];
        for (path, size) in expected {
            let path = path.expect("figure was not rendered");
            assert!(path.starts_with(&config.output_dir));
            assert_eq!(image::image_dimensions(path).unwrap(), size, "{}", path.display());
        }
        assert!(config.output_dir.join(SUMMARY_JSON).is_file());
    }

    #[test]
    fn test_run_rejects_missing_input() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig {
            input: dir.path().join("absent.csv"),
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let err = run(&config).unwrap_err();
        assert!(format!("{err:#}").contains("does not exist"));
    }
}
