use std::sync::Once;

use pretty_assertions::assert_eq;
use tubeport_core::{
    update, ActionFailure, AppState, CollectionEntry, Effect, Msg, NotificationLevel,
    OutputFormat, OutputSelection, Quality, Subject, SubjectKind, SubjectMetadata,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn subject(url: &str, kind: SubjectKind, title: &str, entries: usize) -> Subject {
    Subject {
        kind,
        url: url.to_string(),
        metadata: SubjectMetadata {
            title: title.to_string(),
            duration_secs: Some(212),
            view_count: Some(1_000),
            uploader: "uploader".to_string(),
            entries: (0..entries)
                .map(|i| CollectionEntry {
                    id: format!("e{i}"),
                    title: format!("entry {i}"),
                    url: None,
                    duration_secs: None,
                })
                .collect(),
            ..SubjectMetadata::default()
        },
    }
}

fn analyze(state: AppState, url: &str, result: Result<Subject, ActionFailure>) -> AppState {
    let (state, _) = update(state, Msg::UrlSubmitted(url.to_string()));
    let (state, _) = update(
        state,
        Msg::AnalysisCompleted {
            url: url.to_string(),
            result,
        },
    );
    state
}

#[test]
fn single_and_collection_urls_request_matching_analysis() {
    init_logging();
    let single = "https://www.youtube.com/watch?v=abc";
    let (state, effects) = update(AppState::new(), Msg::UrlSubmitted(format!("  {single} ")));
    assert_eq!(
        effects,
        vec![Effect::Analyze {
            url: single.to_string(),
            kind: SubjectKind::Single,
        }]
    );
    assert_eq!(state.view().analyzing.as_deref(), Some(single));

    let playlist = "https://www.youtube.com/playlist?list=xyz";
    let (_state, effects) = update(state, Msg::UrlSubmitted(playlist.to_string()));
    assert_eq!(
        effects,
        vec![Effect::Analyze {
            url: playlist.to_string(),
            kind: SubjectKind::Collection,
        }]
    );
}

#[test]
fn analysis_sets_subject_of_matching_kind() {
    init_logging();
    let single = "https://www.youtube.com/watch?v=abc";
    let state = analyze(
        AppState::new(),
        single,
        Ok(subject(single, SubjectKind::Single, "A video", 0)),
    );
    let view = state.view();
    let shown = view.subject.expect("subject");
    assert_eq!(shown.kind, SubjectKind::Single);
    assert_eq!(shown.duration, "3:32");
    assert!(view.analyzing.is_none());

    let playlist = "https://www.youtube.com/playlist?list=xyz";
    let state = analyze(
        state,
        playlist,
        Ok(subject(playlist, SubjectKind::Collection, "A list", 3)),
    );
    let shown = state.view().subject.expect("subject");
    assert_eq!(shown.kind, SubjectKind::Collection);
    assert_eq!(shown.entry_count, 3);
}

#[test]
fn blank_url_is_rejected_locally() {
    init_logging();
    let (mut state, effects) = update(AppState::new(), Msg::UrlSubmitted("   ".to_string()));
    assert!(effects.is_empty());
    let notes = state.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert_eq!(notes[0].text, "Please enter a URL");
}

#[test]
fn stale_analysis_response_is_discarded() {
    init_logging();
    let url_a = "https://www.youtube.com/watch?v=aaa";
    let url_b = "https://www.youtube.com/watch?v=bbb";

    let (state, _) = update(AppState::new(), Msg::UrlSubmitted(url_a.to_string()));
    let (state, _) = update(state, Msg::UrlSubmitted(url_b.to_string()));

    // B answers first, then A's slow response lands.
    let (state, _) = update(
        state,
        Msg::AnalysisCompleted {
            url: url_b.to_string(),
            result: Ok(subject(url_b, SubjectKind::Single, "B", 0)),
        },
    );
    let (state, _) = update(
        state,
        Msg::AnalysisCompleted {
            url: url_a.to_string(),
            result: Ok(subject(url_a, SubjectKind::Single, "A", 0)),
        },
    );
    assert_eq!(state.view().subject.unwrap().title, "B");
}

#[test]
fn stale_response_before_newer_one_never_shows() {
    init_logging();
    let url_a = "https://www.youtube.com/watch?v=aaa";
    let url_b = "https://www.youtube.com/watch?v=bbb";

    let (state, _) = update(AppState::new(), Msg::UrlSubmitted(url_a.to_string()));
    let (state, _) = update(state, Msg::UrlSubmitted(url_b.to_string()));
    let (mut state, _) = update(
        state,
        Msg::AnalysisCompleted {
            url: url_a.to_string(),
            result: Ok(subject(url_a, SubjectKind::Single, "A", 0)),
        },
    );
    assert!(state.view().subject.is_none());
    assert_eq!(state.view().analyzing.as_deref(), Some(url_b));
    assert!(state.take_notifications().is_empty());
}

#[test]
fn submitting_a_different_url_clears_subject() {
    init_logging();
    let url_a = "https://www.youtube.com/watch?v=aaa";
    let state = analyze(
        AppState::new(),
        url_a,
        Ok(subject(url_a, SubjectKind::Single, "A", 0)),
    );
    let (state, _) = update(state, Msg::UrlSubmitted(url_a.to_string()));
    assert!(state.view().subject.is_some());

    let (state, _) = update(
        state,
        Msg::UrlSubmitted("https://www.youtube.com/watch?v=bbb".to_string()),
    );
    assert!(state.view().subject.is_none());
}

#[test]
fn failed_analysis_surfaces_server_reason() {
    init_logging();
    let url = "https://example.com/not-a-video";
    let mut state = analyze(
        AppState::new(),
        url,
        Err(ActionFailure::AnalysisFailed {
            reason: Some("Error extracting video info: unsupported".to_string()),
        }),
    );
    assert!(state.view().subject.is_none());
    let notes = state.take_notifications();
    assert_eq!(notes[0].text, "Error extracting video info: unsupported");

    let mut state = analyze(state, url, Err(ActionFailure::AnalysisFailed { reason: None }));
    assert_eq!(state.take_notifications()[0].text, "Failed to load video info");
}

#[test]
fn selection_defaults_and_changes() {
    init_logging();
    let state = AppState::new();
    assert_eq!(
        state.selection(),
        OutputSelection {
            format: OutputFormat::Mp4,
            quality: Quality::P720,
        }
    );

    let (state, _) = update(state, Msg::FormatSelected(OutputFormat::Mp3));
    let (mut state, _) = update(state, Msg::QualitySelected(Quality::P1080));
    assert!(state.consume_dirty());
    assert_eq!(state.view().selection.format, OutputFormat::Mp3);
    assert_eq!(state.view().selection.quality, Quality::P1080);

    let (mut state, _) = update(state, Msg::QualitySelected(Quality::P1080));
    assert!(!state.consume_dirty());
}

#[test]
fn reselecting_current_format_changes_nothing() {
    init_logging();
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::FormatSelected(OutputFormat::Mp4));

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn start_requires_subject() {
    init_logging();
    let (mut state, effects) = update(AppState::new(), Msg::StartClicked);
    assert!(effects.is_empty());
    assert_eq!(
        state.take_notifications()[0].text,
        "Please load video info first"
    );
}

#[test]
fn start_uses_subject_url_and_selection() {
    init_logging();
    let url = "https://www.youtube.com/watch?v=abc";
    let state = analyze(
        AppState::new(),
        url,
        Ok(subject(url, SubjectKind::Single, "A", 0)),
    );
    let (state, _) = update(state, Msg::FormatSelected(OutputFormat::Mp3));
    let (_state, effects) = update(state, Msg::StartClicked);
    assert_eq!(
        effects,
        vec![Effect::StartJob {
            url: url.to_string(),
            selection: OutputSelection {
                format: OutputFormat::Mp3,
                quality: Quality::P720,
            },
        }]
    );
}
