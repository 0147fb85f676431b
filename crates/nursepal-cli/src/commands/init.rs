//! The `nursepal init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("nursepal.toml").exists() {
        println!("nursepal.toml already exists, skipping.");
    } else {
        std::fs::write("nursepal.toml", SAMPLE_CONFIG)?;
        println!("Created nursepal.toml");
    }

    println!("\nNext steps:");
    println!("  1. Export NURSEPAL_TOKEN with your access token");
    println!("  2. Run: nursepal take --course 1 --test 0");
    println!("  3. Run: nursepal take --course 1 --test 1 --mode practice");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# nursepal configuration

api_base_url = "https://nursepal-backend.onrender.com/api/v1"
access_token = "${NURSEPAL_TOKEN}"
request_timeout_secs = 30
default_mode = "practice"
exam_free_navigation = false
"#;
