//! End-to-end close confirmation scenarios driven through the shell, with
//! a scripted engine answering the modified-forms queries.

mod common;

use common::{FormsAnswer, ScriptedBackend};
use gossamer::config::Config;
use gossamer::navigation::{ClickModifiers, NavigationRequest, NavigationTrigger};
use gossamer::shell::{BrowserShell, PromptKind};
use std::sync::Arc;
use tempfile::tempdir;

fn test_config() -> Config {
    Config {
        restore_session: false,
        ..Config::default()
    }
}

fn shell_with(
    answers: Vec<FormsAnswer>,
    config: Config,
    profile: &std::path::Path,
) -> (
    BrowserShell,
    std::rc::Rc<std::cell::RefCell<common::BackendState>>,
) {
    let (backend, state) = ScriptedBackend::new(answers);
    let shell = BrowserShell::new(config, profile.to_path_buf(), false, Arc::new(backend));
    (shell, state)
}

fn ctrl_click(url: &str) -> NavigationRequest {
    NavigationRequest {
        url: url.to_string(),
        trigger: NavigationTrigger::LinkClick,
        modifiers: ClickModifiers {
            control: true,
            ..Default::default()
        },
        from_popup: false,
        app_origin: None,
    }
}

#[test]
fn clean_window_closes_without_any_dialog() {
    let temp = tempdir().unwrap();
    let (mut shell, _state) = shell_with(
        vec![FormsAnswer::Clean; 3],
        test_config(),
        temp.path(),
    );

    let window = shell.open_window(Some("https://a.example/"));
    shell.request_navigation(window, ctrl_click("https://b.example/"));
    shell.request_navigation(window, ctrl_click("https://c.example/"));
    shell.pump_events();
    assert_eq!(shell.window(window).unwrap().tabs().len(), 3);

    shell.request_close_window(window);
    shell.pump_events();

    assert_eq!(shell.window_count(), 0);
    assert_eq!(shell.take_prompt(), None);
}

#[test]
fn dirty_tab_is_activated_and_prompts_once() {
    let temp = tempdir().unwrap();
    let (mut shell, _state) = shell_with(
        vec![FormsAnswer::Clean, FormsAnswer::Dirty],
        test_config(),
        temp.path(),
    );

    let window = shell.open_window(Some("https://a.example/"));
    shell.request_navigation(window, ctrl_click("https://b.example/"));
    shell.pump_events();

    // Background tab: activation stayed on the first tab.
    assert_eq!(shell.window(window).unwrap().tabs().active_index(), Some(0));

    shell.request_close_window(window);
    shell.pump_events();

    let prompt = shell.take_prompt().expect("close-document prompt");
    assert_eq!(prompt.window, window);
    assert_eq!(prompt.kind, PromptKind::CloseDocument);
    assert_eq!(shell.take_prompt(), None);

    // The dirty tab was brought to front before the dialog.
    assert_eq!(shell.window(window).unwrap().tabs().active_index(), Some(1));

    shell.answer_close_document(window, true);
    shell.pump_events();
    assert_eq!(shell.window_count(), 0);
}

#[test]
fn declined_document_prompt_leaves_window_untouched() {
    let temp = tempdir().unwrap();
    let (mut shell, _state) = shell_with(
        vec![FormsAnswer::Dirty],
        test_config(),
        temp.path(),
    );

    let window = shell.open_window(Some("https://a.example/"));
    shell.pump_events();

    shell.request_close_window(window);
    shell.pump_events();
    assert!(shell.take_prompt().is_some());

    shell.answer_close_document(window, false);
    shell.pump_events();
    assert_eq!(shell.window_count(), 1);
    assert_eq!(shell.window(window).unwrap().tabs().len(), 1);

    // Immediately eligible for a new close attempt.
    shell.request_close_window(window);
    shell.pump_events();
    assert!(shell.take_prompt().is_some());
}

#[test]
fn late_completions_after_dirty_do_not_reprompt() {
    // Five tabs, all parked. The second reports dirty first; the other
    // in-flight completions arrive after cancellation and must change
    // nothing.
    let temp = tempdir().unwrap();
    let (mut shell, state) = shell_with(
        vec![FormsAnswer::Park; 5],
        test_config(),
        temp.path(),
    );

    let window = shell.open_window(Some("https://a.example/"));
    for url in [
        "https://b.example/",
        "https://c.example/",
        "https://d.example/",
        "https://e.example/",
    ] {
        shell.request_navigation(window, ctrl_click(url));
    }
    shell.pump_events();
    assert_eq!(shell.window(window).unwrap().tabs().len(), 5);

    shell.request_close_window(window);
    assert_eq!(state.borrow().parked.len(), 5);

    let parked: Vec<_> = state.borrow_mut().parked.drain(..).collect();
    let mut parked = parked.into_iter();

    let (_, first) = parked.next().unwrap();
    first.resolve(Ok(false));
    shell.pump_events();
    assert_eq!(shell.take_prompt(), None);

    let (second_address, second) = parked.next().unwrap();
    second.resolve(Ok(true));
    shell.pump_events();
    let prompt = shell.take_prompt().expect("single close-document prompt");
    assert_eq!(prompt.kind, PromptKind::CloseDocument);
    assert_eq!(
        shell.window(window).unwrap().tabs().active_id(),
        Some(second_address.tab)
    );

    // Remaining three completions: cancelled round, all discarded.
    for (_, probe) in parked {
        probe.resolve(Ok(true));
    }
    shell.pump_events();
    assert_eq!(shell.take_prompt(), None);
    assert_eq!(shell.window_count(), 1);
    assert_eq!(
        shell.window(window).unwrap().tabs().active_id(),
        Some(second_address.tab)
    );

    shell.answer_close_document(window, true);
    shell.pump_events();
    assert_eq!(shell.window_count(), 0);
}

#[test]
fn second_close_request_is_ignored_while_pending() {
    let temp = tempdir().unwrap();
    let (mut shell, state) = shell_with(
        vec![FormsAnswer::Park; 2],
        test_config(),
        temp.path(),
    );

    let window = shell.open_window(Some("https://a.example/"));
    shell.request_navigation(window, ctrl_click("https://b.example/"));
    shell.pump_events();

    shell.request_close_window(window);
    assert_eq!(state.borrow().parked.len(), 2);

    // Still closing: no second round of queries goes out.
    shell.request_close_window(window);
    assert_eq!(state.borrow().parked.len(), 2);
}

#[test]
fn failed_query_never_blocks_close() {
    let temp = tempdir().unwrap();
    let (mut shell, _state) = shell_with(
        vec![FormsAnswer::Fail, FormsAnswer::Clean],
        test_config(),
        temp.path(),
    );

    let window = shell.open_window(Some("https://a.example/"));
    shell.request_navigation(window, ctrl_click("https://b.example/"));
    shell.pump_events();

    shell.request_close_window(window);
    shell.pump_events();
    assert_eq!(shell.window_count(), 0);
    assert_eq!(shell.take_prompt(), None);
}

#[test]
fn ongoing_download_prompts_before_close() {
    let temp = tempdir().unwrap();
    let (mut shell, _state) = shell_with(
        vec![FormsAnswer::Clean],
        test_config(),
        temp.path(),
    );

    let window = shell.open_window(Some("https://a.example/"));
    shell.pump_events();
    shell
        .window_mut(window)
        .unwrap()
        .start_download("https://a.example/big.iso".to_string());

    shell.request_close_window(window);
    shell.pump_events();

    let prompt = shell.take_prompt().expect("downloads prompt");
    assert_eq!(prompt.kind, PromptKind::AbortDownloads);

    // Declining keeps the window and its download.
    shell.answer_abort_downloads(window, false);
    shell.pump_events();
    assert_eq!(shell.window_count(), 1);
    assert!(shell.window(window).unwrap().downloads().has_active());

    // Confirming cancels the download and closes.
    shell.request_close_window(window);
    shell.pump_events();
    assert!(shell.take_prompt().is_some());
    shell.answer_abort_downloads(window, true);
    shell.pump_events();
    assert_eq!(shell.window_count(), 0);
}

#[test]
fn lockdown_refuses_close_without_running_checks() {
    let temp = tempdir().unwrap();
    let config = Config {
        lockdown_disable_quit: true,
        ..test_config()
    };
    let (mut shell, state) = shell_with(vec![FormsAnswer::Dirty], config, temp.path());

    let window = shell.open_window(Some("https://a.example/"));
    shell.pump_events();

    shell.request_close_window(window);
    shell.pump_events();

    assert_eq!(shell.window_count(), 1);
    assert_eq!(shell.take_prompt(), None);
    // No forms queries were even dispatched.
    assert!(state.borrow().parked.is_empty());
    assert!(shell.last_status().is_some());
}
