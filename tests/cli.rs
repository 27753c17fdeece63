use std::error::Error;
use std::fs;
use std::process::{Command, Output};
use tempfile::tempdir;

fn pixelveil_command() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pixelveil"))
}

fn run(args: &[&str]) -> Result<Output, Box<dyn Error>> {
    Ok(pixelveil_command().args(args).output()?)
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{} failed: {}",
        what,
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn version_flag_prints_build_information() -> Result<(), Box<dyn Error>> {
    let output = run(&["--version"])?;
    assert_success(&output, "version");
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("pixelveil "), "unexpected version line: {}", stdout);
    Ok(())
}

#[test]
fn cli_end_to_end_flow() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.png");
    let stego = dir.path().join("stego.png");
    let recovered = dir.path().join("recovered.txt");
    let cover_str = cover.to_str().unwrap();
    let stego_str = stego.to_str().unwrap();

    assert_success(&run(&["generate", "64x64", cover_str])?, "generate");

    let capacity = run(&["capacity", cover_str])?;
    assert_success(&capacity, "capacity");
    assert!(String::from_utf8(capacity.stdout)?.contains("Carrier Capacity"));

    let embed = run(&[
        "embed",
        cover_str,
        stego_str,
        "--message",
        "Super secret payload",
        "--bits",
        "2",
    ])?;
    assert_success(&embed, "embed");
    assert!(String::from_utf8(embed.stdout)?.contains("Embedded into"));

    let extract = run(&[
        "extract",
        stego_str,
        "--bits",
        "2",
        "--output",
        recovered.to_str().unwrap(),
    ])?;
    assert_success(&extract, "extract");
    assert_eq!(fs::read(&recovered)?, b"Super secret payload");

    let to_stdout = run(&["extract", stego_str, "--density", "standard"])?;
    assert_success(&to_stdout, "extract to stdout");
    assert_eq!(to_stdout.stdout, b"Super secret payload");

    let compare = run(&["compare", cover_str, stego_str, "--json"])?;
    assert_success(&compare, "compare");
    let report: serde_json::Value = serde_json::from_slice(&compare.stdout)?;
    assert!(report["psnr"].as_f64().unwrap_or(0.0) > 40.0);

    let detect = run(&["detect", stego_str])?;
    assert_success(&detect, "detect");
    assert!(String::from_utf8(detect.stdout)?.contains("Verdict:"));
    Ok(())
}

#[test]
fn password_protected_embed_and_extract() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.png");
    let stego = dir.path().join("stego.png");
    let cover_str = cover.to_str().unwrap();
    let stego_str = stego.to_str().unwrap();

    assert_success(&run(&["generate", "48x48", cover_str])?, "generate");
    let embed = run(&[
        "embed",
        cover_str,
        stego_str,
        "--message",
        "eyes only",
        "--password",
        "correct horse",
    ])?;
    assert_success(&embed, "embed --password");

    let opened = run(&["extract", stego_str, "--password", "correct horse"])?;
    assert_success(&opened, "extract --password");
    assert_eq!(opened.stdout, b"eyes only");

    let raw = run(&["extract", stego_str])?;
    assert_success(&raw, "extract without password");
    assert_ne!(raw.stdout, b"eyes only");

    let wrong = run(&["extract", stego_str, "-p", "battery staple"])?;
    assert!(!wrong.status.success());
    assert!(String::from_utf8(wrong.stderr)?.contains("wrong password"));
    Ok(())
}

#[test]
fn split_and_combine_commands() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.png");
    let shares = dir.path().join("shares");
    let payload = dir.path().join("payload.bin");
    let recovered = dir.path().join("recovered.bin");
    fs::write(&payload, [0u8, 1, 2, 3, 254, 255])?;

    assert_success(&run(&["generate", "40x40", cover.to_str().unwrap()])?, "generate");

    let split = run(&[
        "split",
        "--carrier",
        cover.to_str().unwrap(),
        "--parts",
        "3",
        "--file",
        payload.to_str().unwrap(),
        "--output-dir",
        shares.to_str().unwrap(),
    ])?;
    assert_success(&split, "split");
    assert!(shares.join("manifest.json").exists());

    let combine = run(&[
        "combine",
        "--manifest",
        shares.join("manifest.json").to_str().unwrap(),
        "--output",
        recovered.to_str().unwrap(),
    ])?;
    assert_success(&combine, "combine");
    assert_eq!(fs::read(&recovered)?, vec![0u8, 1, 2, 3, 254, 255]);

    let partial = run(&[
        "combine",
        shares.join("share_0.png").to_str().unwrap(),
        shares.join("share_1.png").to_str().unwrap(),
    ])?;
    assert!(!partial.status.success());
    assert!(String::from_utf8(partial.stderr)?.contains("Incomplete share set"));
    Ok(())
}

#[test]
fn errors_exit_with_failure() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.png");
    assert_success(&run(&["generate", "8x8", cover.to_str().unwrap()])?, "generate");

    let too_big = run(&[
        "embed",
        cover.to_str().unwrap(),
        dir.path().join("out.png").to_str().unwrap(),
        "--message",
        "this message is far too long for an eight by eight carrier",
    ])?;
    assert!(!too_big.status.success());
    assert!(String::from_utf8(too_big.stderr)?.contains("Error:"));

    let lossy = run(&[
        "embed",
        cover.to_str().unwrap(),
        dir.path().join("out.jpg").to_str().unwrap(),
        "--message",
        "x",
    ])?;
    assert!(!lossy.status.success());
    assert!(String::from_utf8(lossy.stderr)?.contains("Unsupported image format"));
    Ok(())
}

#[test]
fn detect_text_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let text = dir.path().join("note.txt");
    fs::write(&text, "nothing\u{200D}here")?;
    let output = run(&["detect", "--text", "--json", text.to_str().unwrap()])?;
    assert_success(&output, "detect --text");
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["verdict"], "likely_stego");
    Ok(())
}
