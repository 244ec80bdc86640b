use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::thread;

use clap::{Parser, Subcommand};
use serde::Serialize;

use lostfound_redact_core::blurring::infrastructure::cpu_region_redactor::CpuRegionRedactor;
use lostfound_redact_core::detection::infrastructure::detector_pool::DetectorPool;
use lostfound_redact_core::detection::infrastructure::model_loader::{
    load_detector_pool, ModelPaths,
};
use lostfound_redact_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use lostfound_redact_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use lostfound_redact_core::matching::candidate_scorer::score_candidates;
use lostfound_redact_core::matching::item::{MatchRequest, MatchResponse};
use lostfound_redact_core::pipeline::mask_image_use_case::MaskingPipeline;
use lostfound_redact_core::pipeline::masked_destination::masked_destination;
use lostfound_redact_core::pipeline::masking_error::MaskingError;
use lostfound_redact_core::shared::constants::IMAGE_EXTENSIONS;
use lostfound_redact_core::shared::model_resolver::ModelResolver;

/// Privacy redaction for lost-and-found photos and found-item matching.
#[derive(Parser)]
#[command(name = "lostfound-redact", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Blur faces and ID text in photos, writing redacted copies.
    Mask {
        /// Photos to redact.
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Output file (single input only). Defaults to the `masked`
        /// counterpart of the input's `originals` directory.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Directory holding the face, text detection and recognition
        /// models plus the OCR dictionary. Required in practice: the
        /// download URLs are not published yet.
        #[arg(long)]
        model_dir: Option<PathBuf>,

        /// Photos processed in parallel; one detector instance each.
        #[arg(long, default_value_t = default_workers())]
        workers: usize,
    },
    /// Rank found items against a lost item. Reads JSON from a file or `-`.
    Match {
        /// `{"lost_item": {...}, "candidates": [...]}`
        request: PathBuf,
    },
}

/// One line of `mask` output.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum MaskReport {
    Success {
        image: PathBuf,
        masked_path: PathBuf,
        regions_count: usize,
    },
    Error {
        image: PathBuf,
        kind: &'static str,
        detail: String,
    },
}

impl MaskReport {
    fn is_error(&self) -> bool {
        matches!(self, MaskReport::Error { .. })
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        Command::Mask {
            images,
            output,
            model_dir,
            workers,
        } => run_mask(images, output, model_dir, workers),
        Command::Match { request } => run_match(&request),
    }
}

fn run_mask(
    images: Vec<PathBuf>,
    output: Option<PathBuf>,
    model_dir: Option<PathBuf>,
    workers: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    validate_mask(&images, output.as_deref(), workers)?;

    let resolver = ModelResolver::new(model_dir)?.with_progress(Box::new(download_progress));
    let paths = ModelPaths::resolve(&resolver)?;
    let workers = workers.min(images.len());
    let detectors = Arc::new(load_detector_pool(&paths, workers)?);

    let jobs: Vec<(PathBuf, PathBuf)> = images
        .into_iter()
        .map(|image| {
            let dest = output.clone().unwrap_or_else(|| masked_destination(&image));
            (image, dest)
        })
        .collect();
    let reports = mask_all(&jobs, &detectors, workers);

    let failed = reports.iter().filter(|r| r.is_error()).count();
    for report in &reports {
        println!("{}", serde_json::to_string(report)?);
    }
    if failed > 0 {
        return Err(format!("{failed} of {} images failed", reports.len()).into());
    }
    Ok(())
}

/// Runs every job on `workers` threads and returns reports in input order.
fn mask_all(
    jobs: &[(PathBuf, PathBuf)],
    detectors: &Arc<DetectorPool>,
    workers: usize,
) -> Vec<MaskReport> {
    let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, &(PathBuf, PathBuf))>();
    let (report_tx, report_rx) = crossbeam_channel::unbounded();
    for job in jobs.iter().enumerate() {
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    thread::scope(|scope| {
        for _ in 0..workers.max(1) {
            let job_rx = job_rx.clone();
            let report_tx = report_tx.clone();
            let detectors = Arc::clone(detectors);
            scope.spawn(move || {
                let pipeline = MaskingPipeline::new(
                    Box::new(ImageFileReader::new()),
                    Box::new(ImageFileWriter::new()),
                    detectors,
                    Box::new(CpuRegionRedactor::default()),
                );
                for (index, (image, dest)) in job_rx {
                    let _ = report_tx.send((index, mask_one(&pipeline, image, dest)));
                }
            });
        }
    });
    drop(report_tx);

    let mut reports: Vec<(usize, MaskReport)> = report_rx.into_iter().collect();
    reports.sort_by_key(|(index, _)| *index);
    reports.into_iter().map(|(_, report)| report).collect()
}

fn mask_one(pipeline: &MaskingPipeline, image: &Path, dest: &Path) -> MaskReport {
    let error = |kind, detail: String| {
        log::warn!("{}: {detail}", image.display());
        MaskReport::Error {
            image: image.to_path_buf(),
            kind,
            detail,
        }
    };

    if !image.exists() {
        let err = MaskingError::SourceNotFound(image.to_path_buf());
        return error(err.kind(), err.to_string());
    }
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(parent) {
            return error(
                "encode_failure",
                format!("cannot create {}: {e}", parent.display()),
            );
        }
    }

    match pipeline.process_to(image, dest) {
        Ok(regions_count) => MaskReport::Success {
            image: image.to_path_buf(),
            masked_path: dest.to_path_buf(),
            regions_count,
        },
        Err(e) => error(e.kind(), e.to_string()),
    }
}

fn run_match(request: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let request = read_request(request)?;
    let matches = score_candidates(&request.lost_item, &request.candidates);
    log::info!(
        "{} of {} candidates matched",
        matches.len(),
        request.candidates.len()
    );
    println!("{}", serde_json::to_string(&MatchResponse { matches })?);
    Ok(())
}

fn read_request(path: &Path) -> Result<MatchRequest, Box<dyn std::error::Error>> {
    let json = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {e}", path.display()))?
    };
    Ok(serde_json::from_str(&json)?)
}

fn validate_mask(
    images: &[PathBuf],
    output: Option<&Path>,
    workers: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if workers == 0 {
        return Err("Workers must be at least 1".into());
    }
    if output.is_some() && images.len() > 1 {
        return Err("--output can only be used with a single input image".into());
    }
    for image in images.iter().filter(|i| !is_image(i)) {
        log::warn!("{} does not look like a photo", image.display());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get().min(4))
        .unwrap_or(1)
}

fn download_progress(name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {name}... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading {name}... {downloaded} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_report_shape() {
        let report = MaskReport::Success {
            image: PathBuf::from("uploads/originals/a.jpg"),
            masked_path: PathBuf::from("uploads/masked/a.jpg"),
            regions_count: 2,
        };
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["masked_path"], "uploads/masked/a.jpg");
        assert_eq!(json["regions_count"], 2);
    }

    #[test]
    fn test_error_report_shape() {
        let report = MaskReport::Error {
            image: PathBuf::from("a.jpg"),
            kind: "source_not_found",
            detail: "source image not found: a.jpg".to_string(),
        };
        assert!(report.is_error());
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "source_not_found");
    }

    #[test]
    fn test_read_request_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("req.json");
        std::fs::write(
            &path,
            r#"{"lost_item": {"category": "Wallet", "lat": 12.9, "lng": 77.6},
                "candidates": [{"id": 1, "category": "wallet", "lat": 12.901, "lng": 77.599}]}"#,
        )
        .unwrap();
        let request = read_request(&path).unwrap();
        let matches = score_candidates(&request.lost_item, &request.candidates);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].score, 50);
    }

    #[test]
    fn test_read_request_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("req.json");
        std::fs::write(&path, r#"{"lost_item": {}}"#).unwrap();
        assert!(read_request(&path).is_err());
    }

    #[test]
    fn test_validate_mask() {
        let one = [PathBuf::from("a.jpg")];
        let two = [PathBuf::from("a.jpg"), PathBuf::from("b.png")];
        assert!(validate_mask(&one, Some(Path::new("out.jpg")), 2).is_ok());
        assert!(validate_mask(&two, Some(Path::new("out.jpg")), 2).is_err());
        assert!(validate_mask(&two, None, 0).is_err());
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(Path::new("photo.JPG")));
        assert!(is_image(Path::new("scan.webp")));
        assert!(!is_image(Path::new("notes.txt")));
        assert!(!is_image(Path::new("no_extension")));
    }
}
