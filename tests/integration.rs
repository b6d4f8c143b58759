use dirsnap::{
    ContentSerializer, DisplayPath, Serialized, SkipReason, SnapBuilder, SnapOptions,
    SnapshotReport, TreeRenderer, RuleSet, snapshot, snapshot_to_file,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run(options: &SnapOptions) -> (String, SnapshotReport) {
    let mut buf = Vec::new();
    let report = snapshot(options, &mut buf).unwrap();
    (String::from_utf8(buf).unwrap(), report)
}

fn tree_of(options: &SnapOptions, root: &Path) -> String {
    let hard = RuleSet::new(&options.hard_filters);
    TreeRenderer::new(options, &hard).render(root).unwrap()
}

fn block_header(path: &Path) -> String {
    format!("## File: {}\n", path.display())
}

#[test]
fn integration_full_flow() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/lib.rs"), "pub fn test() {}\n").unwrap();
    let options = SnapBuilder::new(dir.path()).build();
    let (doc, report) = run(&options);

    assert!(doc.starts_with("# Project Structure\n\n```text\n"));
    let structure = doc.find("# Project Structure").unwrap();
    let contents = doc.find("# File Contents").unwrap();
    assert!(structure < contents);
    assert!(doc.contains("├── src\n│   └── lib.rs\n└── main.rs\n"));
    assert!(doc.contains(&format!(
        "{}\n```rs\nfn main() {{}}\n```\n\n---\n\n",
        block_header(&dir.path().join("main.rs"))
    )));
    assert!(doc.contains("```rs\npub fn test() {}\n```"));
    assert_eq!(report.files.len(), 2);
    assert!(report.is_success());
}
#[test]
fn test_tree_layout_directories_first() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    fs::write(dir.path().join("b.txt"), "b").unwrap();
    fs::create_dir_all(dir.path().join("src/nested")).unwrap();
    fs::write(dir.path().join("src/main.rs"), "").unwrap();
    fs::write(dir.path().join("src/nested/deep.rs"), "").unwrap();
    fs::create_dir(dir.path().join("zeta")).unwrap();
    let options = SnapBuilder::new(dir.path()).build();

    let tree = tree_of(&options, dir.path());
    let expected = "\
├── src
│   ├── nested
│   │   └── deep.rs
│   └── main.rs
├── zeta
├── a.txt
└── b.txt
";
    assert_eq!(tree, expected);
}
#[test]
fn test_folding_exactness() {
    let dir = tempdir().unwrap();
    let many = dir.path().join("many");
    fs::create_dir(&many).unwrap();
    for i in 0..30 {
        fs::write(many.join(format!("f{:02}.txt", i)), "x").unwrap();
    }
    let options = SnapBuilder::new(dir.path()).build();
    let tree = tree_of(&options, dir.path());

    let lines: Vec<&str> = tree.lines().collect();
    assert_eq!(lines[0], "└── many");
    let section = &lines[1..];
    assert_eq!(section.len(), 17);
    assert_eq!(section[0], "    ├── f00.txt");
    assert_eq!(section[7], "    ├── f07.txt");
    assert_eq!(section[8], "    ├── ... (14 files hidden) ...");
    assert_eq!(section[9], "    ├── f22.txt");
    assert_eq!(section[16], "    └── f29.txt");
    for i in 8..22 {
        assert!(!tree.contains(&format!("f{:02}.txt", i)));
    }
}
#[test]
fn test_folding_disabled_lists_everything() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        fs::write(dir.path().join(format!("f{:02}.txt", i)), "x").unwrap();
    }
    let options = SnapBuilder::new(dir.path()).fold(false).build();
    let tree = tree_of(&options, dir.path());
    assert_eq!(tree.lines().count(), 30);
    assert!(!tree.contains("files hidden"));
}
#[test]
fn test_directories_are_never_folded() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        fs::create_dir(dir.path().join(format!("d{:02}", i))).unwrap();
    }
    let options = SnapBuilder::new(dir.path()).build();
    let tree = tree_of(&options, dir.path());
    assert_eq!(tree.lines().count(), 30);
}
#[test]
fn test_hard_filter_hides_everywhere() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("private")).unwrap();
    fs::write(dir.path().join("private/key.txt"), "k").unwrap();
    fs::write(dir.path().join("notes.txt"), "n").unwrap();
    fs::write(dir.path().join("debug.log"), "d").unwrap();
    let options = SnapBuilder::new(dir.path())
        .hard_filters(vec!["private/".into(), "*.log".into()])
        .build();
    let (doc, report) = run(&options);

    assert!(!doc.contains("private"));
    assert!(!doc.contains("key.txt"));
    assert!(!doc.contains("debug.log"));
    assert!(doc.contains("notes.txt"));
    assert_eq!(report.files, vec![dir.path().join("notes.txt")]);
}
#[test]
fn test_soft_filter_keeps_tree_entry() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("data.snap"), "snapshot").unwrap();
    fs::write(dir.path().join("keep.snap"), "kept").unwrap();
    fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();
    let options = SnapBuilder::new(dir.path())
        .soft_filters(vec!["!keep.snap".into(), "*.snap".into()])
        .build();
    let (doc, report) = run(&options);

    assert!(doc.contains("├── data.snap\n"));
    assert!(!doc.contains(&block_header(&dir.path().join("data.snap"))));
    assert!(doc.contains(&block_header(&dir.path().join("keep.snap"))));
    assert_eq!(
        report.skip_reason(&dir.path().join("data.snap")),
        Some(&SkipReason::SoftFiltered {
            rule: "*.snap".into()
        })
    );
}
#[test]
fn test_soft_filtered_directory_is_pruned_from_contents() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("fixtures")).unwrap();
    fs::write(dir.path().join("fixtures/case.txt"), "c").unwrap();
    let options = SnapBuilder::new(dir.path())
        .soft_filters(vec!["fixtures".into()])
        .build();
    let (doc, report) = run(&options);

    assert!(doc.contains("└── fixtures\n    └── case.txt\n"));
    assert!(report.files.is_empty());
    assert_eq!(
        report.skip_reason(&dir.path().join("fixtures")),
        Some(&SkipReason::SoftFilteredDir {
            rule: "fixtures".into()
        })
    );
    assert_eq!(report.skip_reason(&dir.path().join("fixtures/case.txt")), None);
}
#[test]
fn test_contents_only_hard_rule_keeps_empty_directory() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("cache")).unwrap();
    fs::write(dir.path().join("cache/blob.txt"), "b").unwrap();
    let options = SnapBuilder::new(dir.path())
        .hard_filters(vec!["cache/*".into()])
        .build();
    let (doc, report) = run(&options);
    assert!(doc.contains("└── cache\n"));
    assert!(!doc.contains("blob.txt"));
    assert!(report.files.is_empty());
}
#[test]
fn test_junk_and_assets() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    fs::write(dir.path().join(".git/config"), "[core]").unwrap();
    fs::create_dir(dir.path().join("node_modules")).unwrap();
    fs::write(dir.path().join("node_modules/dep.js"), "x").unwrap();
    fs::write(dir.path().join(".env"), "KEY=1\n").unwrap();
    fs::write(dir.path().join(".hidden"), "h").unwrap();
    fs::write(dir.path().join("logo.png"), "not really a png").unwrap();
    let options = SnapBuilder::new(dir.path()).build();
    let (doc, report) = run(&options);

    assert!(!doc.contains(".git"));
    assert!(!doc.contains("node_modules"));
    assert!(!doc.contains(".hidden"));
    assert!(doc.contains(&block_header(&dir.path().join(".env"))));
    assert!(doc.contains("└── logo.png\n"));
    assert_eq!(
        report.skip_reason(&dir.path().join("logo.png")),
        Some(&SkipReason::Asset)
    );

    let options = SnapBuilder::new(dir.path()).include_hidden(true).build();
    let (doc, _) = run(&options);
    assert!(doc.contains(".hidden"));
    assert!(!doc.contains(".git"));
}
#[test]
fn test_own_binaries_are_junk_by_default() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("dirsnap"), "#!/bin/sh\n").unwrap();
    fs::write(dir.path().join("dirsnap.exe"), "MZ").unwrap();
    fs::write(dir.path().join("dirsnap.rs"), "fn main() {}\n").unwrap();
    let options = SnapBuilder::new(dir.path()).build();
    let (doc, report) = run(&options);

    assert!(!doc.contains("── dirsnap\n"));
    assert!(!doc.contains("── dirsnap.exe\n"));
    assert!(doc.contains("└── dirsnap.rs\n"));
    assert_eq!(report.files, vec![dir.path().join("dirsnap.rs")]);
    assert!(report.skip_reason(&dir.path().join("dirsnap")).is_none());
}
#[test]
fn test_binary_gate_and_forced_text() {
    let dir = tempdir().unwrap();
    let bytes = b"int x;\0\n".to_vec();
    fs::write(dir.path().join("blob.dat"), &bytes).unwrap();
    fs::write(dir.path().join("code.c"), &bytes).unwrap();
    let options = SnapBuilder::new(dir.path()).build();
    let serializer = ContentSerializer::new(&options);

    assert_eq!(
        serializer.serialize(&dir.path().join("blob.dat")),
        Serialized::Skipped(SkipReason::Binary)
    );
    match serializer.serialize(&dir.path().join("code.c")) {
        Serialized::Emitted(block) => {
            assert_eq!(block.language, "c");
            assert_eq!(block.content, "int x;\0\n");
        }
        other => panic!("expected a content block, got {:?}", other),
    }

    let (doc, report) = run(&options);
    assert!(doc.contains("├── blob.dat\n"));
    assert!(!doc.contains(&block_header(&dir.path().join("blob.dat"))));
    assert_eq!(report.files, vec![dir.path().join("code.c")]);
}
#[test]
fn test_gbk_content_is_converted() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("readme.txt"), [0xD6, 0xD0, 0xCE, 0xC4]).unwrap();
    fs::write(dir.path().join("garbage.txt"), [0xFF, 0xFF, 0x41]).unwrap();
    let options = SnapBuilder::new(dir.path()).build();
    let (doc, report) = run(&options);

    assert!(doc.contains("```text\n中文\n```"));
    assert_eq!(report.converted, vec![dir.path().join("readme.txt")]);
    assert!(!doc.contains(&block_header(&dir.path().join("garbage.txt"))));
    assert_eq!(
        report.skip_reason(&dir.path().join("garbage.txt")),
        Some(&SkipReason::UnknownEncoding)
    );
}
#[test]
fn test_newline_termination() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.md"), "no newline").unwrap();
    fs::write(dir.path().join("b.md"), "has newline\n").unwrap();
    fs::write(dir.path().join("c.md"), "").unwrap();
    let options = SnapBuilder::new(dir.path()).build();
    let (doc, _) = run(&options);

    assert!(doc.contains("```markdown\nno newline\n```\n"));
    assert!(doc.contains("```markdown\nhas newline\n```\n"));
    assert!(!doc.contains("has newline\n\n```"));
    assert!(doc.contains(&format!(
        "{}\n```markdown\n```\n",
        block_header(&dir.path().join("c.md"))
    )));
}
#[test]
fn test_file_size_limit() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("big.txt"), "A".repeat(5000)).unwrap();
    fs::write(dir.path().join("small.txt"), "A").unwrap();
    let options = SnapBuilder::new(dir.path()).max_file_size(100).build();
    let (doc, report) = run(&options);

    assert!(doc.contains("big.txt"));
    assert!(!doc.contains(&block_header(&dir.path().join("big.txt"))));
    assert_eq!(
        report.skip_reason(&dir.path().join("big.txt")),
        Some(&SkipReason::TooLarge {
            size: 5000,
            limit: 100
        })
    );
    assert_eq!(report.files, vec![dir.path().join("small.txt")]);
}
#[test]
fn test_missing_file_is_skipped_quietly() {
    let dir = tempdir().unwrap();
    let options = SnapBuilder::new(dir.path()).build();
    let serializer = ContentSerializer::new(&options);
    assert_eq!(
        serializer.serialize(&dir.path().join("gone.txt")),
        Serialized::Skipped(SkipReason::Metadata)
    );
}
#[test]
fn test_relative_display_paths() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/lib.rs"), "pub fn f() {}\n").unwrap();
    let options = SnapBuilder::new(dir.path())
        .display(DisplayPath::Relative)
        .build();
    let (doc, _) = run(&options);
    let name = dir.path().file_name().unwrap().to_string_lossy().into_owned();
    assert!(doc.contains(&format!("## File: {}/src/lib.rs\n", name)));
    assert!(doc.contains(&format!("```text\n{}/\n", name)));
}
#[test]
fn test_multiple_roots_structure_before_contents() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("one.txt"), "1").unwrap();
    fs::write(second.path().join("two.txt"), "2").unwrap();
    let options = SnapBuilder::new(first.path()).root(second.path()).build();
    let (doc, report) = run(&options);

    let contents = doc.find("# File Contents").unwrap();
    let one_tree = doc.find("└── one.txt").unwrap();
    let two_tree = doc.find("└── two.txt").unwrap();
    assert!(one_tree < two_tree && two_tree < contents);
    let one_block = doc.find(&block_header(&first.path().join("one.txt"))).unwrap();
    let two_block = doc.find(&block_header(&second.path().join("two.txt"))).unwrap();
    assert!(contents < one_block && one_block < two_block);
    assert_eq!(report.files.len(), 2);
}
#[test]
fn test_missing_root_is_reported_and_others_proceed() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("ok.txt"), "fine").unwrap();
    let missing = dir.path().join("does-not-exist");
    let options = SnapBuilder::new(&missing).root(dir.path()).build();
    let (doc, report) = run(&options);

    assert!(doc.contains("Error generating tree for"));
    assert!(doc.contains(&block_header(&dir.path().join("ok.txt"))));
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].root, missing);
    assert!(!report.is_success());
}
#[test]
fn test_output_document_excludes_itself() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();
    let out = dir.path().join("snap.md");
    fs::write(&out, "stale content from an earlier run").unwrap();
    let options = SnapBuilder::new(dir.path()).output(&out).build();
    let report = snapshot_to_file(&options).unwrap();

    assert_eq!(report.output.as_deref(), Some(out.as_path()));
    let doc = fs::read_to_string(&out).unwrap();
    assert!(!doc.contains("snap.md"));
    assert!(!doc.contains("stale content"));
    assert!(doc.contains(&block_header(&dir.path().join("main.rs"))));
}
#[test]
fn test_output_directory_gets_generated_name() {
    let dir = tempdir().unwrap();
    let project = dir.path().join("proj");
    fs::create_dir(&project).unwrap();
    fs::write(project.join("main.rs"), "fn main() {}\n").unwrap();
    let out_dir = dir.path().join("out");
    let options = SnapBuilder::new(&project).output(&out_dir).build();
    let report = snapshot_to_file(&options).unwrap();

    let expected = out_dir.join("proj_context.md");
    assert_eq!(report.output.as_deref(), Some(expected.as_path()));
    assert!(fs::read_to_string(expected).unwrap().contains("main.rs"));
}
#[test]
fn test_report_serializes_to_json() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("logo.png"), "x").unwrap();
    let options = SnapBuilder::new(dir.path()).build();
    let (_, report) = run(&options);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["skipped"][0]["reason"], "asset");
    assert!(json["errors"].as_array().unwrap().is_empty());
}
