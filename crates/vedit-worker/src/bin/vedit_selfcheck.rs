use std::path::Path;
use std::process::Command;

use vedit_models::Font;
use vedit_worker::EditorConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = EditorConfig::from_env()?;

    println!(
        "vedit-selfcheck: starting with work_dir={}",
        config.work_dir.display()
    );
    ensure_workdir(&config.work_dir).await?;
    ensure_ffmpeg(config.ffmpeg_path.as_deref())?;
    report_fonts(&config.font_dir);

    println!("vedit-selfcheck: ok");
    Ok(())
}

async fn ensure_workdir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path).await?;
    let probe = path.join(".selfcheck");
    tokio::fs::write(&probe, b"ok").await?;
    tokio::fs::remove_file(&probe).await?;
    Ok(())
}

fn ensure_ffmpeg(configured: Option<&Path>) -> anyhow::Result<()> {
    let binary = match configured {
        Some(path) => path.to_path_buf(),
        None => which::which("ffmpeg").map_err(|e| anyhow::anyhow!("ffmpeg not in PATH: {}", e))?,
    };

    let output = Command::new(&binary)
        .arg("-version")
        .output()
        .map_err(|e| anyhow::anyhow!("ffmpeg not available: {}", e))?;

    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "ffmpeg -version failed: {:?}",
            output.status
        ));
    }
    Ok(())
}

// Missing fonts only disable text overlays with that font.
fn report_fonts(dir: &Path) {
    for font in Font::ALL {
        let path = dir.join(font.source_file());
        if path.exists() {
            println!("vedit-selfcheck: font {} found", font.name());
        } else {
            println!("vedit-selfcheck: font {} missing at {}", font.name(), path.display());
        }
    }
}
