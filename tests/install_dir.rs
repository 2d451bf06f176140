use lloconv::config::Config;
use lloconv::install::{resolve_with_env, vendor_installs, InstallSource};
use std::fs;
use std::path::{Path, PathBuf};

fn isolated_config(root: &Path) -> Config {
    let mut cfg = Config::default();
    cfg.engine.search_dirs = vec![root.join("usr/lib/libreoffice/program").display().to_string()];
    cfg.engine.vendor_root = root.join("opt").display().to_string();
    cfg.engine.fallback_install_dir = "/nonexistent/program".into();
    cfg
}

fn make_install(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("versionrc"), "[Version]\n").unwrap();
}

#[test]
fn config_beats_environment() {
    let root = tempfile::tempdir().unwrap();
    let mut cfg = isolated_config(root.path());
    cfg.engine.install_dir = "/srv/lo/program".into();

    let (dir, source) = resolve_with_env(&cfg, Some(PathBuf::from("/env/program"))).unwrap();
    assert_eq!(dir, PathBuf::from("/srv/lo/program"));
    assert_eq!(source, InstallSource::Config);
}

#[test]
fn environment_beats_probing() {
    let root = tempfile::tempdir().unwrap();
    let cfg = isolated_config(root.path());
    make_install(&root.path().join("usr/lib/libreoffice/program"));

    let (dir, source) = resolve_with_env(&cfg, Some(PathBuf::from("/env/program"))).unwrap();
    assert_eq!(dir, PathBuf::from("/env/program"));
    assert_eq!(source, InstallSource::Environment);
}

#[test]
fn distribution_layout_is_checked_first() {
    let root = tempfile::tempdir().unwrap();
    let cfg = isolated_config(root.path());
    let debian = root.path().join("usr/lib/libreoffice/program");
    make_install(&debian);
    make_install(&root.path().join("opt/libreoffice7.6/program"));

    let (dir, source) = resolve_with_env(&cfg, None).unwrap();
    assert_eq!(dir, debian);
    assert_eq!(source, InstallSource::Detected);
}

#[test]
fn newest_vendor_install_with_versionrc_wins() {
    let root = tempfile::tempdir().unwrap();
    let cfg = isolated_config(root.path());
    make_install(&root.path().join("opt/libreoffice5.2/program"));
    make_install(&root.path().join("opt/libreoffice24.8/program"));
    fs::create_dir_all(root.path().join("opt/libreoffice25.2/program")).unwrap();

    let (dir, _) = resolve_with_env(&cfg, None).unwrap();
    assert_eq!(dir, root.path().join("opt/libreoffice24.8/program"));
}

#[test]
fn vendor_dirs_sort_newest_first() {
    let root = tempfile::tempdir().unwrap();
    for name in ["libreoffice", "libreoffice4.3", "libreoffice7.10", "libreoffice7.6", "openoffice4"] {
        fs::create_dir_all(root.path().join(name)).unwrap();
    }

    let found = vendor_installs(root.path()).unwrap();
    let names: Vec<_> = found
        .iter()
        .map(|p| p.parent().unwrap().file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["libreoffice7.10", "libreoffice7.6", "libreoffice4.3", "libreoffice"]);
}

#[test]
fn falls_back_to_default_path() {
    let root = tempfile::tempdir().unwrap();
    let cfg = isolated_config(root.path());

    let (dir, source) = resolve_with_env(&cfg, None).unwrap();
    assert_eq!(dir, PathBuf::from("/nonexistent/program"));
    assert_eq!(source, InstallSource::Fallback);
}

#[test]
fn empty_environment_value_is_ignored() {
    let root = tempfile::tempdir().unwrap();
    let cfg = isolated_config(root.path());

    let (_, source) = resolve_with_env(&cfg, Some(PathBuf::new())).unwrap();
    assert_eq!(source, InstallSource::Fallback);
}
