use ssviz_core::{DotBracket, Visualizer};

fn main() -> ssviz_core::Result<()> {
    let structures = [
        ("hairpin", "(((...)))", "GGGAAACCC"),
        ("nick", "((.+.))", "GGA+ACC"),
        (
            "multiloop",
            "(((..((...))..((..))...)))",
            "GGGAAGGAAACCAAGGAACCAAACCC",
        ),
    ];

    let visualizer = Visualizer::default();
    let dir = std::env::temp_dir();
    for (name, structure, seq) in &structures {
        let n = structure.chars().filter(|&c| c != '+').count();
        // ramp from 0 to 1, leaving the last residue without a score
        let scores: Vec<Option<f64>> = (0..n - 1)
            .map(|i| Some(i as f64 / (n - 2).max(1) as f64))
            .collect();
        let doc = visualizer.visualize(&DotBracket::new(*seq, *structure), &scores);
        let svg = doc.to_string();
        let path = dir.join(format!("ssviz-{name}.svg"));
        std::fs::write(&path, &svg)?;
        println!("wrote {} ({} bytes)", path.display(), svg.len());
    }
    Ok(())
}
