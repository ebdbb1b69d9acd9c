use figcue_core::clipzone::MergeOptions;
use figcue_core::labels::LabeledSegment;
use figcue_core::SeparationReport;

pub fn print_separation(report: &SeparationReport, options: &MergeOptions) {
    println!(
        "=== Figure separation ({}, {}) ===\n",
        options.overlap, options.eligibility
    );

    if report.files.is_empty() {
        println!("  No .vec page files found.\n");
        return;
    }

    let max_name = report
        .files
        .iter()
        .map(|f| file_name(&f.source).len())
        .max()
        .unwrap_or(10);

    for file in &report.files {
        let name = file_name(&file.source);
        if let Some(ref error) = file.error {
            println!("  {:<width$}  FAILED: {}", name, error, width = max_name);
            continue;
        }
        if file.zones.is_empty() {
            println!("  {:<width$}  no figures", name, width = max_name);
            continue;
        }
        for (i, zone) in file.zones.iter().enumerate() {
            let label = if i == 0 { name.as_str() } else { "" };
            println!(
                "  {:<width$}  -> {:<20} {:>4} primitive(s), {} region(s)  [{}]",
                label,
                file_name(&zone.path),
                zone.members,
                zone.regions,
                zone.key,
                width = max_name
            );
        }
    }

    let failed = report.failures().count();
    println!();
    print!(
        "  {} zone file(s) from {} page file(s)",
        report.zone_count(),
        report.files.len()
    );
    if failed > 0 {
        print!(", {failed} failed");
    }
    println!("\n");
}

pub fn print_segments(segments: &[LabeledSegment]) {
    if segments.is_empty() {
        println!("  No captions found.");
        return;
    }

    let mut page = None;
    for segment in segments {
        if page != Some(segment.page_number) {
            if page.is_some() {
                println!();
            }
            println!("--- Page {} ---\n", segment.page_number);
            page = Some(segment.page_number);
        }
        println!("  {:<15} {}", segment.label.as_tag(), segment.text);
    }
    println!();
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
