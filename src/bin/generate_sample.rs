//! Write a synthetic CORD-19 style `metadata.csv` (zipped when the output
//! ends in `.zip`) for trying the analysis without the real dataset.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

const COLUMNS: [&str; 19] = [
    "cord_uid",
    "sha",
    "source_x",
    "title",
    "doi",
    "pmcid",
    "pubmed_id",
    "license",
    "abstract",
    "publish_time",
    "authors",
    "journal",
    "mag_id",
    "who_covidence_id",
    "arxiv_id",
    "pdf_json_files",
    "pmc_json_files",
    "url",
    "s2_id",
];

const SOURCES: [&str; 6] = ["PMC", "Medline", "WHO", "Elsevier", "MedRxiv", "ArXiv"];
const LICENSES: [&str; 4] = ["cc-by", "cc-by-nc", "no-cc", "els-covid"];
const JOURNALS: [&str; 10] = [
    "PLoS One",
    "BMJ",
    "The Lancet",
    "Sci Rep",
    "Nature",
    "Journal of Virology",
    "Int J Environ Res Public Health",
    "Viruses",
    "Cureus",
    "Front Immunol",
];
const TOPIC_WORDS: [&str; 24] = [
    "covid", "sars", "cov", "coronavirus", "pandemic", "patients", "vaccine", "vaccines",
    "infection", "respiratory", "clinical", "outbreak", "transmission", "immune", "response",
    "hospital", "mortality", "children", "analysis", "study", "health", "care", "model",
    "treatment",
];
const FILLER_WORDS: [&str; 10] = [
    "the", "and", "for", "with", "from", "of", "in", "a", "during", "among",
];
const SURNAMES: [&str; 8] = [
    "Wang", "Smith", "Garcia", "Chen", "Müller", "Rossi", "Kim", "Okafor",
];

#[derive(Parser)]
#[command(about = "Generate a synthetic CORD-19 metadata file")]
struct Args {
    /// Number of records
    #[arg(long, default_value_t = 5000)]
    rows: usize,

    /// Output path (.csv or .zip)
    #[arg(long, default_value = "sample_metadata.csv.zip")]
    out: PathBuf,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick with a skew towards the front of the list.
    fn skewed<'a>(&mut self, items: &[&'a str]) -> &'a str {
        let u = self.next_f64();
        items[((u * u) * items.len() as f64) as usize % items.len()]
    }

    fn id(&mut self, len: usize) -> String {
        const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
        (0..len)
            .map(|_| ALPHABET[self.below(ALPHABET.len())] as char)
            .collect()
    }
}

fn sentence(rng: &mut SimpleRng, words: usize) -> String {
    (0..words)
        .map(|i| {
            if i % 3 == 2 {
                FILLER_WORDS[rng.below(FILLER_WORDS.len())]
            } else {
                rng.skewed(&TOPIC_WORDS)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn publish_time(rng: &mut SimpleRng) -> String {
    let year = 2000 + rng.below(22);
    let roll = rng.next_f64();
    if roll < 0.02 {
        format!("Spring {year}")
    } else if roll < 0.22 {
        year.to_string()
    } else if roll < 0.27 {
        format!("{year}-{:02}", 1 + rng.below(12))
    } else {
        // Recent years dominate, as in the real corpus.
        let year = if rng.chance(0.7) { 2020 + rng.below(2) } else { year };
        format!("{year}-{:02}-{:02}", 1 + rng.below(12), 1 + rng.below(28))
    }
}

/// Return `value` with probability `p`, else an empty (missing) cell.
fn maybe(rng: &mut SimpleRng, p: f64, value: impl FnOnce(&mut SimpleRng) -> String) -> String {
    if rng.chance(p) {
        value(rng)
    } else {
        String::new()
    }
}

fn record(rng: &mut SimpleRng) -> Vec<String> {
    let cord_uid = rng.id(8);
    let source = rng.skewed(&SOURCES).to_string();
    vec![
        cord_uid.clone(),
        maybe(rng, 0.4, |r| r.id(40)),
        source,
        maybe(rng, 0.99, |r| {
            let n = 4 + r.below(9);
            let mut title = sentence(r, n);
            if let Some(first) = title.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            title
        }),
        maybe(rng, 0.7, |r| format!("10.{}/{}", 1000 + r.below(9000), r.id(10))),
        maybe(rng, 0.35, |r| format!("PMC{}", 1_000_000 + r.below(8_000_000))),
        maybe(rng, 0.55, |r| (10_000_000 + r.below(25_000_000)).to_string()),
        rng.skewed(&LICENSES).to_string(),
        maybe(rng, 0.75, |r| {
            let n = 40 + r.below(260);
            sentence(r, n)
        }),
        maybe(rng, 0.98, publish_time),
        maybe(rng, 0.95, |r| {
            (0..1 + r.below(5))
                .map(|_| {
                    let surname = SURNAMES[r.below(SURNAMES.len())];
                    let initial = (b'A' + r.below(26) as u8) as char;
                    format!("{surname}, {initial}.")
                })
                .collect::<Vec<_>>()
                .join("; ")
        }),
        maybe(rng, 0.85, |r| r.skewed(&JOURNALS).to_string()),
        String::new(),
        maybe(rng, 0.3, |r| format!("#{}", r.below(100_000))),
        maybe(rng, 0.05, |r| format!("{}.{:05}", 2000 + r.below(200), r.below(100_000))),
        maybe(rng, 0.4, |r| format!("document_parses/pdf_json/{}.json", r.id(40))),
        maybe(rng, 0.3, |r| {
            format!("document_parses/pmc_json/PMC{}.xml.json", r.below(9_000_000))
        }),
        format!("https://example.org/papers/{cord_uid}"),
        maybe(rng, 0.8, |r| r.below(250_000_000).to_string()),
    ]
}

fn write_csv<W: Write>(sink: W, rows: usize, rng: &mut SimpleRng) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(COLUMNS)?;
    for _ in 0..rows {
        writer.write_record(record(rng))?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let file = File::create(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    let zipped = args
        .out
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"));

    if zipped {
        let mut zip = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file("metadata.csv", options)?;
        write_csv(&mut zip, args.rows, &mut rng)?;
        zip.finish()?;
    } else {
        write_csv(file, args.rows, &mut rng)?;
    }

    println!("Wrote {} records to {}", args.rows, args.out.display());
    Ok(())
}
