use enginedoctor_core::source_catalog;

pub fn run() {
    let catalog = source_catalog();
    let available = catalog.iter().filter(|s| s.available).count();

    println!(
        "Found {available} of {} audio source(s) usable on this machine:\n",
        catalog.len()
    );
    for status in &catalog {
        let info = &status.info;
        let icon = if status.available {
            "\u{2705}"
        } else {
            "\u{274C}"
        };
        println!("  {icon} {:<14} [{}] {}", info.name, info.kind, info.description);
        if !status.available && !info.requires.is_empty() {
            println!("  {:<17} needs: {}", "", info.requires.join(", "));
        }
    }
}
