use droid_port::artifact::ArtifactKind;
use droid_port::normalize::{normalize, NormalizeOptions, MARKER_PREFIX};

#[test]
fn test_agent_shorthand_without_known_targets() {
    let body = "Review the diff.\nagent reviewer --strict\nThen summarise.\n";
    let result = normalize(body, &NormalizeOptions::new(ArtifactKind::Command));

    let rewritten = result
        .text
        .lines()
        .find(|line| line.contains("reviewer"))
        .unwrap();
    assert!(rewritten.starts_with("Use the Task tool to delegate to the `reviewer` droid"));
    assert!(rewritten.contains("(if available)"));
    assert!(rewritten.ends_with(" --strict"));

    assert_eq!(result.referenced_droids, vec!["reviewer"]);
    assert_eq!(result.unresolved_droids, vec!["reviewer"]);
    assert!(result.text.contains("Review the diff.\n"));
    assert!(result.text.contains("Then summarise.\n"));
}

#[test]
fn test_known_targets_are_direct() {
    let options = NormalizeOptions::new(ArtifactKind::Droid)
        .without_marker()
        .with_known_droids(["reviewer".to_string()])
        .with_known_skills(["pdf".to_string()]);
    let result = normalize("agent reviewer\nskill pdf\n", &options);

    assert_eq!(
        result.text,
        "Use the Task tool to delegate to the `reviewer` droid\nUse the Skill tool to invoke the `pdf` skill\n"
    );
    assert!(result.unresolved_droids.is_empty());
    assert!(result.unresolved_skills.is_empty());
}

#[test]
fn test_marker_prepended_once() {
    let options = NormalizeOptions::new(ArtifactKind::Skill);
    let once = normalize("Use the AskUserQuestion tool to pick.\n", &options);

    assert!(once.text.starts_with(MARKER_PREFIX));
    assert!(once.text.starts_with("<!-- droid-port: normalized skill (ask-user) -->\n"));

    let twice = normalize(&once.text, &options);
    assert_eq!(twice.text, once.text);
    assert!(!twice.changed);
}

#[test]
fn test_normalize_is_idempotent() {
    let bodies = [
        "",
        "plain text\n",
        "agent reviewer --strict\n",
        "  agent Review.Bot go\n\tskill charts draw\n",
        "Use AskUserQuestion. Or use the askuserquestion tool.\nAskUserQuestion\n",
        "mid-line agent reviewer stays\nskill\n",
        "agent a\r\nskill b\r\n",
    ];

    for body in bodies {
        for options in [
            NormalizeOptions::new(ArtifactKind::Command),
            NormalizeOptions::new(ArtifactKind::Command).without_marker(),
            NormalizeOptions::new(ArtifactKind::Droid).with_known_droids(["a".to_string()]),
        ] {
            let once = normalize(body, &options);
            let twice = normalize(&once.text, &options);
            assert_eq!(twice.text, once.text, "body: {:?}", body);
        }
    }
}

#[test]
fn test_unchanged_text_reports_no_change() {
    let result = normalize(
        "Nothing legacy here.\n",
        &NormalizeOptions::new(ArtifactKind::Command),
    );
    assert!(!result.changed);
    assert!(result.notes.is_empty());
    assert!(result.referenced_droids.is_empty());
    assert_eq!(result.text, "Nothing legacy here.\n");
}
