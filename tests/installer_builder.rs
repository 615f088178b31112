mod common;

use common::{FakeArchiver, Harness, MAKENSIS, RecordingRunner, RecordingSigner, define, has_define};
use kodegen_bundler_nsis::bundler::{
    BundleSettings, Compression, FileAssociation, ResourceOverride,
    collaborators::ProcessOutput,
    platform::windows::nsis::{
        BuildOutcome, BuildState, HostPlatform, InstallerBuilder, InstallerReport,
    },
    settings::Arch,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

fn builder(h: &Harness, bundle: BundleSettings) -> InstallerBuilder {
    InstallerBuilder::new(h.settings(bundle), h.collaborators(), Harness::toolset())
        .with_host(HostPlatform::Other)
}

fn installer_report(outcome: BuildOutcome) -> InstallerReport {
    match outcome {
        BuildOutcome::Installer(report) => report,
        BuildOutcome::DryRun { .. } => panic!("expected an installer"),
    }
}

#[tokio::test]
async fn one_click_x64_builds_uninstaller_then_installer() {
    let h = Harness::new();
    let mut b = builder(&h, BundleSettings::default());
    b.build(Arch::X64, h.app_dir("win-unpacked"));

    let report = installer_report(b.finish_build().await.unwrap());
    assert_eq!(b.state(), BuildState::Done);

    let requests = h.runner.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].program, PathBuf::from(MAKENSIS));
    assert_eq!(requests[1].program, PathBuf::from("wine"));
    assert_eq!(requests[2].program, PathBuf::from(MAKENSIS));

    let installer = h.out_dir().join("Demo App Setup 1.0.0.exe");
    assert_eq!(requests[1].args, vec![installer.display().to_string()]);

    let uninstaller_args = &requests[0].args;
    let installer_args = &requests[2].args;
    assert!(has_define(uninstaller_args, "BUILD_UNINSTALLER"));
    assert!(!has_define(installer_args, "BUILD_UNINSTALLER"));
    assert!(has_define(installer_args, "ONE_CLICK"));

    let archive = h.out_dir().join("demo-1.0.0-x64.nsis.7z");
    assert_eq!(
        define(uninstaller_args, "APP_64"),
        Some(archive.display().to_string().as_str())
    );
    assert_eq!(define(uninstaller_args, "APP_64"), define(installer_args, "APP_64"));

    let uninstaller = h.project().join("tmp").join("t-uninstaller.exe");
    let wine_path = define(uninstaller_args, "UNINSTALLER_OUT_FILE").unwrap();
    assert!(wine_path.starts_with("Z:\\"));
    assert!(!wine_path.contains('/'));
    assert_eq!(
        define(installer_args, "UNINSTALLER_OUT_FILE"),
        Some(uninstaller.display().to_string().as_str())
    );

    assert_eq!(installer_args.first().map(String::as_str), Some("-WX"));
    assert_eq!(installer_args.last().map(String::as_str), Some("-"));
    assert!(requests[2].env.iter().any(|(k, v)| k == "NSISDIR" && v == "/opt/nsis"));

    assert_eq!(*h.signer.signed.lock().unwrap(), vec![uninstaller.clone(), installer.clone()]);
    assert_eq!(
        *h.sink.artifacts.lock().unwrap(),
        vec![(installer.clone(), "demo-Setup-1.0.0.exe".to_string())]
    );
    assert_eq!(report.installer_path, installer);
    assert_eq!(report.uninstaller_path, Some(uninstaller));
    assert!(report.cleanup_errors.is_empty());
    assert!(!archive.exists(), "intermediate archive is removed");
}

#[tokio::test]
async fn custom_script_skips_uninstaller() {
    let mut h = Harness::new();
    h.add_resource("installer.nsi", "Name \"custom\"\n");
    let mut b = builder(&h, BundleSettings::default());
    b.build(Arch::X64, h.app_dir("win-unpacked"));

    let report = installer_report(b.finish_build().await.unwrap());

    let requests = h.runner.requests();
    assert_eq!(requests.len(), 1);
    assert!(!has_define(&requests[0].args, "BUILD_UNINSTALLER"));
    assert!(!has_define(&requests[0].args, "UNINSTALLER_OUT_FILE"));
    assert_eq!(requests[0].stdin.as_deref(), Some("Name \"custom\"\n"));

    let installer = h.out_dir().join("Demo App Setup 1.0.0.exe");
    assert_eq!(*h.signer.signed.lock().unwrap(), vec![installer]);
    assert_eq!(report.uninstaller_path, None);
}

#[tokio::test]
async fn associations_generate_register_and_unregister_macros() {
    let mut h = Harness::new();
    h.add_resource("foo.ico", "");
    let bundle = BundleSettings {
        file_associations: vec![
            FileAssociation::new(".foo", "Foo Document").description("Foo file"),
            FileAssociation::new("bar", "Bar Document"),
        ],
        ..Default::default()
    };
    let mut b = builder(&h, bundle);
    b.build(Arch::X64, h.app_dir("win-unpacked"));
    b.finish_build().await.unwrap();

    let compiles = h.runner.compiler_requests();
    assert_eq!(compiles.len(), 2);
    let uninstaller_script = compiles[0].stdin.clone().unwrap();
    let installer_script = compiles[1].stdin.clone().unwrap();

    assert!(installer_script.starts_with("!macro registerFileAssociations\n"));
    assert!(installer_script.contains("!include FileAssociation.nsh\n"));
    assert_eq!(installer_script.matches("  File \"/oname=resources\\").count(), 1);
    assert_eq!(installer_script.matches("!insertmacro APP_ASSOCIATE \"").count(), 2);
    assert!(!installer_script.contains("!macro unregisterFileAssociations"));

    assert!(uninstaller_script.starts_with("!macro unregisterFileAssociations\n"));
    assert!(uninstaller_script.contains("!insertmacro APP_UNASSOCIATE \"foo\" \"Foo Document\""));
    assert!(uninstaller_script.contains("!insertmacro APP_UNASSOCIATE \"bar\" \"Bar Document\""));
    assert!(!uninstaller_script.contains("!macro registerFileAssociations"));
}

#[tokio::test]
async fn no_associations_means_no_association_library() {
    let h = Harness::new();
    let mut b = builder(&h, BundleSettings::default());
    b.build(Arch::X64, h.app_dir("win-unpacked"));
    b.finish_build().await.unwrap();

    for request in h.runner.compiler_requests() {
        let script = request.stdin.unwrap();
        assert!(!script.contains("FileAssociation.nsh"));
        assert!(!script.starts_with("!macro"));
    }
}

#[tokio::test]
async fn include_fragment_is_prepended() {
    let mut h = Harness::new();
    h.add_resource("installer.nsh", "!macro customInstall\n!macroend\n");
    let mut b = builder(&h, BundleSettings::default());
    b.build(Arch::X64, h.app_dir("win-unpacked"));
    b.finish_build().await.unwrap();

    let build_dir = h.project().join("build");
    let expected = format!(
        "!include \"{}\"\n!addincludedir \"{}\"\n",
        build_dir.join("installer.nsh").display(),
        build_dir.display()
    );
    for request in h.runner.compiler_requests() {
        assert!(request.stdin.unwrap().starts_with(&expected));
    }
}

#[tokio::test]
async fn installer_compile_failure_registers_nothing() {
    let runner = RecordingRunner::with(|request, index| {
        if request.program == Path::new(MAKENSIS) && index > 0 {
            ProcessOutput {
                code: Some(1),
                stdout: String::new(),
                stderr: "Error: invalid script".into(),
            }
        } else {
            ProcessOutput::success()
        }
    });
    let h = Harness::with_parts(runner, RecordingSigner::default());
    let mut b = builder(&h, BundleSettings::default());
    b.build(Arch::X64, h.app_dir("win-unpacked"));

    let err = b.finish_build().await.unwrap_err();
    assert_eq!(err.step(), Some(BuildState::BuildingInstaller));
    assert!(err.to_string().contains("invalid script"));
    assert_eq!(b.state(), BuildState::Failed);
    assert!(h.sink.artifacts.lock().unwrap().is_empty());
    assert_eq!(h.signer.signed.lock().unwrap().len(), 1, "only the uninstaller was signed");
    assert!(
        h.out_dir().join("demo-1.0.0-x64.nsis.7z").exists(),
        "archives are left in place on failure"
    );
}

#[tokio::test]
async fn self_extraction_failure_aborts_before_signing() {
    let runner = RecordingRunner::with(|request, _| {
        if request.program == Path::new("wine") {
            ProcessOutput {
                code: Some(53),
                ..Default::default()
            }
        } else {
            ProcessOutput::success()
        }
    });
    let h = Harness::with_parts(runner, RecordingSigner::default());
    let mut b = builder(&h, BundleSettings::default());
    b.build(Arch::X64, h.app_dir("win-unpacked"));

    let err = b.finish_build().await.unwrap_err();
    assert_eq!(err.step(), Some(BuildState::BuildingUninstaller));
    assert!(h.signer.signed.lock().unwrap().is_empty());
    assert_eq!(h.runner.compiler_requests().len(), 1);
}

#[tokio::test]
async fn signing_failure_reports_step() {
    let signer = RecordingSigner {
        fail: true,
        ..Default::default()
    };
    let h = Harness::with_parts(RecordingRunner::succeeding(), signer);
    let mut b = builder(&h, BundleSettings::default());
    b.build(Arch::X64, h.app_dir("win-unpacked"));

    let err = b.finish_build().await.unwrap_err();
    assert_eq!(err.step(), Some(BuildState::SigningUninstaller));
    assert!(h.sink.artifacts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn both_architectures_are_archived_and_defined() {
    let h = Harness::new();
    let bundle = BundleSettings {
        compression: Compression::Maximum,
        ..Default::default()
    };
    let mut b = builder(&h, bundle);
    b.build(Arch::X64, h.app_dir("win-unpacked"));
    b.build(Arch::X86, h.app_dir("win-ia32-unpacked"));
    assert_eq!(b.architectures(), vec![Arch::X64, Arch::X86]);
    b.finish_build().await.unwrap();

    let archived = h.archiver.requests.lock().unwrap();
    assert_eq!(archived.len(), 2);
    assert!(archived.iter().all(|r| r.compression == Compression::Maximum && r.without_dir));

    let installer_args = &h.runner.compiler_requests()[1].args;
    assert!(define(installer_args, "APP_64").unwrap().ends_with("demo-1.0.0-x64.nsis.7z"));
    assert!(define(installer_args, "APP_32").unwrap().ends_with("demo-1.0.0-x86.nsis.7z"));
    assert!(installer_args.contains(&"-XSetCompressor lzma".to_string()));
}

#[tokio::test]
async fn repeated_architecture_keeps_one_archive() {
    let h = Harness::new();
    let mut b = builder(&h, BundleSettings::default());
    b.build(Arch::X64, h.app_dir("first"));
    b.build(Arch::X64, h.app_dir("second"));
    assert_eq!(b.architectures(), vec![Arch::X64]);
    b.finish_build().await.unwrap();

    let archived = h.archiver.requests.lock().unwrap();
    assert_eq!(archived.len(), 2);
    assert_eq!(archived[1].source_dir, h.project().join("second"));
    let installer_args = &h.runner.compiler_requests()[1].args;
    assert_eq!(
        installer_args.iter().filter(|a| a.starts_with("-DAPP_64=")).count(),
        1
    );
}

#[tokio::test]
async fn dry_run_computes_defines_only() {
    let h = Harness::new();
    let settings = h.settings_with(BundleSettings::default(), true);
    let mut b = InstallerBuilder::new(settings, h.collaborators(), Harness::toolset())
        .with_host(HostPlatform::Other);
    b.build(Arch::X64, h.app_dir("win-unpacked"));

    match b.finish_build().await.unwrap() {
        BuildOutcome::DryRun { defines, commands } => {
            assert!(defines.contains("APP_64"));
            assert!(defines.contains("ONE_CLICK"));
            assert!(!defines.contains("BUILD_UNINSTALLER"));
            assert!(commands.contains("OutFile"));
        }
        BuildOutcome::Installer(_) => panic!("dry run must not build"),
    }
    assert!(h.runner.requests().is_empty());
    assert!(h.signer.signed.lock().unwrap().is_empty());
    assert!(h.sink.artifacts.lock().unwrap().is_empty());
    assert!(!h.out_dir().join("demo-1.0.0-x64.nsis.7z").exists());
}

#[tokio::test]
async fn missing_icon_is_a_configuration_error() {
    let mut h = Harness::new();
    h.resources.clear();
    let mut b = builder(&h, BundleSettings::default());
    b.build(Arch::X64, h.app_dir("win-unpacked"));

    let err = b.finish_build().await.unwrap_err();
    assert!(err.is_configuration());
    assert!(h.runner.requests().is_empty());
}

#[tokio::test]
async fn explicit_icon_and_disabled_include() {
    let mut h = Harness::new();
    h.resources.clear();
    h.add_resource("installer.nsh", "");
    let mut bundle = BundleSettings {
        icon: Some(PathBuf::from("assets/app.ico")),
        ..Default::default()
    };
    bundle.windows.nsis.include = ResourceOverride::Disabled;
    let mut b = builder(&h, bundle);
    b.build(Arch::X64, h.app_dir("win-unpacked"));
    b.finish_build().await.unwrap();

    let installer = &h.runner.compiler_requests()[1];
    let icon = h.project().join("assets").join("app.ico");
    assert_eq!(
        define(&installer.args, "MUI_ICON"),
        Some(icon.display().to_string().as_str())
    );
    assert!(!installer.stdin.as_deref().unwrap().contains("installer.nsh"));
}

#[tokio::test]
async fn invalid_association_aborts_before_any_process() {
    for association in [
        FileAssociation::new(".", "Dot"),
        FileAssociation::new("txt", ""),
        FileAssociation::new("txt", "Say \"hi\""),
    ] {
        let h = Harness::new();
        let bundle = BundleSettings {
            file_associations: vec![association],
            ..Default::default()
        };
        let mut b = builder(&h, bundle);
        b.build(Arch::X64, h.app_dir("win-unpacked"));

        let err = b.finish_build().await.unwrap_err();
        assert!(err.is_configuration(), "{err}");
        assert_eq!(err.step(), None);
        assert_eq!(b.state(), BuildState::Failed);
        assert!(h.runner.requests().is_empty());
        assert!(h.signer.signed.lock().unwrap().is_empty());
        assert!(h.sink.artifacts.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn archive_failure_stops_in_collecting_archives() {
    let mut h = Harness::new();
    h.archiver = Arc::new(FakeArchiver {
        fail: true,
        ..Default::default()
    });
    let mut b = builder(&h, BundleSettings::default());
    b.build(Arch::X64, h.app_dir("win-unpacked"));

    let err = b.finish_build().await.unwrap_err();
    assert_eq!(err.step(), Some(BuildState::CollectingArchives));
    assert!(err.to_string().contains("7za exited with code 2"), "{err}");
    assert_eq!(b.state(), BuildState::Failed);
    assert!(h.runner.compiler_requests().is_empty());
    assert!(h.sink.artifacts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn undeletable_archive_is_reported_without_failing() {
    let mut h = Harness::new();
    h.archiver = Arc::new(FakeArchiver {
        as_directory: true,
        ..Default::default()
    });
    let mut b = builder(&h, BundleSettings::default());
    b.build(Arch::X64, h.app_dir("win-unpacked"));

    let report = installer_report(b.finish_build().await.unwrap());
    assert_eq!(b.state(), BuildState::Done);
    assert_eq!(report.cleanup_errors.len(), 1);
    assert_eq!(h.sink.artifacts.lock().unwrap().len(), 1);
    assert!(h.out_dir().join("demo-1.0.0-x64.nsis.7z").exists());
}

#[tokio::test]
async fn replaced_failed_archive_does_not_fail_the_build() {
    let mut h = Harness::new();
    let broken = h.app_dir("broken-unpacked");
    h.archiver = Arc::new(FakeArchiver {
        fail_source: Some(broken.clone()),
        ..Default::default()
    });
    let mut b = builder(&h, BundleSettings::default());
    b.build(Arch::X64, broken);
    b.build(Arch::X64, h.app_dir("win-unpacked"));
    assert_eq!(b.architectures(), vec![Arch::X64]);

    installer_report(b.finish_build().await.unwrap());
    assert_eq!(h.archiver.requests.lock().unwrap().len(), 1);
    assert_eq!(h.runner.compiler_requests().len(), 2);
}
