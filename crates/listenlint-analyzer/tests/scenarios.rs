//! End-to-end scenarios: JavaScript source → lint_source → messages.

use listenlint_analyzer::rule::{DiagnosticKind, PARSE_ERROR_CODE};
use listenlint_analyzer::{lint_source, LintOutcome};
use pretty_assertions::assert_eq;

/// Lint source that must parse, returning the messages in emission order.
fn messages(source: &str) -> Vec<String> {
    match lint_source(source, "test.js") {
        LintOutcome::Analyzed(diagnostics) => diagnostics.into_iter().map(|d| d.message).collect(),
        LintOutcome::SyntaxErrors(errors) => panic!("syntax errors: {:?}", errors),
    }
}

fn unmatched(event: &str, scope: &str, handler: &str) -> String {
    format!(
        "EventListener added for '{}' on '{}' but not removed with removeEventListener for handler '{}'",
        event, scope, handler
    )
}

fn orphan(scope: &str, event: &str, handler: &str) -> String {
    format!(
        "No corresponding addEventListener found for the {}.removeEventListener('{}', {})",
        scope, event, handler
    )
}

fn inline(scope: &str, event: &str, handler: &str) -> String {
    format!(
        "No inline addEventListener handlers allowed. {}.addEventListener('{}', {})",
        scope, event, handler
    )
}

// ============================================================================
// Valid code
// ============================================================================

#[test]
fn paired_listeners_on_every_scope() {
    let source = r#"
        function globalFN() { };
        class test {
            doSomething() { }
            doSomething1() { }
            doSomething2() { }
            connectedCallback() {
                document.addEventListener('keyup', this.doSomething);
                document.removeEventListener('keyup', this.doSomething);
                this.addEventListener('keyup', this.doSomething1);
                this.removeEventListener('keyup', this.doSomething1);
                this.div = document.createElement('div');
                this.div.addEventListener('keyup', this.doSomething2);
                this.div.removeEventListener('keyup', this.doSomething2);
                document.addEventListener('keyup', globalFN);
                document.removeEventListener('keyup', globalFN);

            }
        };
    "#;
    assert_eq!(messages(source), Vec::<String>::new());
}

#[test]
fn once_listeners_need_no_removal() {
    let source = r#"
        class test  {
            doSomething() {}
            connectedCallback() {
                document.addEventListener('keyup', this.doSomething, {once: true });
                document.addEventListener('keyup', this.doSomething, {'once': true });
            }
        };
    "#;
    assert_eq!(messages(source), Vec::<String>::new());
}

#[test]
fn removal_in_another_method_matches() {
    let source = r#"
        class Widget extends HTMLElement {
            connectedCallback() {
                window.addEventListener('resize', this.onResize);
            }
            disconnectedCallback() {
                window.removeEventListener('resize', this.onResize);
            }
            onResize() {}
        }
    "#;
    assert_eq!(messages(source), Vec::<String>::new());
}

#[test]
fn unrelated_calls_are_ignored() {
    let source = r#"
        import { debounce } from './util.js';
        const handler = debounce(() => console.log('x'), 100);
        el.dispatchEvent(new CustomEvent('ping'));
        el.addEventListener('click');
        addEventListener('click', handler);
        el['addEventListener']('click', handler);
        el.addEventListener('click', handler.bind(this));
    "#;
    assert_eq!(messages(source), Vec::<String>::new());
}

// ============================================================================
// Invalid code
// ============================================================================

#[test]
fn unmatched_registrations_on_each_scope() {
    let source = r#"
        class test  {
            doSomething() {}
            connectedCallback() {
                document.addEventListener('click', this.doSomething);
                this.addEventListener('click', this.doSomething);
                this.div  = document.createElement('div');
                this.div.addEventListener('click', this.doSomething);
            }
        };
    "#;
    assert_eq!(
        messages(source),
        vec![
            unmatched("click", "document", "doSomething"),
            unmatched("click", "this", "doSomething"),
            unmatched("click", "div", "doSomething"),
        ]
    );
}

#[test]
fn orphan_removals_on_each_scope() {
    let source = r#"
        class test  {
            doSomething() {}
            connectedCallback() {
                document.removeEventListener('click', this.doSomething);
                this.removeEventListener('click', this.doSomething);
                this.div  = document.createElement('div');
                this.div.removeEventListener('click', this.doSomething);
                let Constants = { SaveEvent : 'saveEvent' };
                let SaveEvent = 'SaveEvent';
                this.removeEventListener(Constants.SaveEvent, this.doSomething);
                document.removeEventListener(SaveEvent, this.doSomething);
            }
        };
    "#;
    assert_eq!(
        messages(source),
        vec![
            orphan("document", "click", "doSomething"),
            orphan("this", "click", "doSomething"),
            orphan("div", "click", "doSomething"),
            orphan("this", "Constants.SaveEvent", "doSomething"),
            orphan("document", "SaveEvent", "doSomething"),
        ]
    );
}

#[test]
fn inline_function_handlers() {
    let source = r#"
        document.addEventListener('click', function testFn(){});
        this.addEventListener('keyup', function testFn(){});"#;
    assert_eq!(
        messages(source),
        vec![
            inline("document", "click", "testFn"),
            inline("this", "keyup", "testFn"),
        ]
    );
}

#[test]
fn anonymous_inline_handlers() {
    let source = r#"
        button.addEventListener('click', () => submit());
        button.addEventListener('focus', function () {}, { once: true });"#;
    assert_eq!(
        messages(source),
        vec![
            inline("button", "click", "<anonymous>"),
            inline("button", "focus", "<anonymous>"),
        ]
    );
}

#[test]
fn member_expression_event_name() {
    let source = r#"
        let Constants= {
            SaveEvent:"saveEvent",
        };
        document.addEventListener(Constants.SaveEvent, globalFN);"#;
    assert_eq!(
        messages(source),
        vec![unmatched("Constants.SaveEvent", "document", "globalFN")]
    );
}

#[test]
fn identifier_event_name() {
    let source = r#"
        let Save = 'saveEvent';
        document.addEventListener(Save, globalFN);"#;
    assert_eq!(messages(source), vec![unmatched("Save", "document", "globalFN")]);
}

#[test]
fn once_false_still_suppresses_tracking() {
    let source = "document.addEventListener('keyup', onKey, { once: false });";
    assert_eq!(messages(source), Vec::<String>::new());
}

#[test]
fn computed_string_once_key_suppresses_tracking() {
    let source = "document.addEventListener('click', onClick, { ['once']: true });";
    assert_eq!(messages(source), Vec::<String>::new());
}

#[test]
fn regex_after_control_statement_is_analysed() {
    let source = "if (ok) /x/.test(s);\nwhile (busy) /y/g.exec(s);\ndocument.addEventListener('click', onClick);";
    assert_eq!(messages(source), vec![unmatched("click", "document", "onClick")]);
}

#[test]
fn private_brand_check_is_analysed() {
    let source = r#"
        class Menu {
            #el;
            static owns(o) { return #el in o; }
            open() { document.addEventListener('click', this.close); }
        }
    "#;
    assert_eq!(messages(source), vec![unmatched("click", "document", "close")]);
}

#[test]
fn escaped_identifiers_pair_with_plain_ones() {
    let source = r#"
        document.addEventListener('click', on\u0043lick);
        document.removeEventListener('click', onClick);
    "#;
    assert_eq!(messages(source), Vec::<String>::new());
}

#[test]
fn differently_spelled_events_do_not_pair() {
    let source = r#"
        const Events = { SAVE: 'save' };
        document.addEventListener('save', onSave);
        document.removeEventListener(Events.SAVE, onSave);
    "#;
    assert_eq!(
        messages(source),
        vec![
            orphan("document", "Events.SAVE", "onSave"),
            unmatched("save", "document", "onSave"),
        ]
    );
}

#[test]
fn scope_comes_from_nearest_property() {
    let source = r#"
        this.shadowRoot.host.addEventListener('click', onClick);
        host.removeEventListener('click', onClick);
    "#;
    assert_eq!(messages(source), Vec::<String>::new());
}

#[test]
fn modern_syntax_is_analysed() {
    let source = r#"
        export default class Panel {
            #open = false;
            static count = 0;
            async connectedCallback() {
                await this.ready?.();
                for (const tab of this.tabs ?? []) {
                    tab?.addEventListener(`select`, this.onSelect, { passive: true });
                }
            }
            onSelect = (event) => { this.#open = !this.#open; };
        }
    "#;
    assert_eq!(messages(source), vec![unmatched("select", "tab", "onSelect")]);
}

// ============================================================================
// Findings metadata and syntax errors
// ============================================================================

#[test]
fn findings_carry_kind_identity_and_location() {
    let source = "el.addEventListener('click', f);\nel.removeEventListener('keyup', f);\n";
    let LintOutcome::Analyzed(diagnostics) = lint_source(source, "src/app.js") else {
        panic!("expected analysis");
    };
    assert_eq!(diagnostics.len(), 2);

    let orphan = &diagnostics[0];
    assert_eq!(orphan.kind, DiagnosticKind::OrphanRemoval);
    assert_eq!(orphan.identity.event, "keyup");
    assert_eq!(orphan.span.file, "src/app.js");
    assert_eq!((orphan.span.start.line, orphan.span.start.column), (2, 1));

    let unmatched = &diagnostics[1];
    assert_eq!(unmatched.kind, DiagnosticKind::UnmatchedRegistration);
    assert_eq!((unmatched.span.start.line, unmatched.span.start.column), (1, 1));
}

#[test]
fn syntax_error_prevents_analysis() {
    let source = "document.addEventListener('click', onClick\nlet = ;";
    match lint_source(source, "broken.js") {
        LintOutcome::SyntaxErrors(errors) => {
            assert!(!errors.is_empty());
            assert!(errors.iter().all(|e| e.is_error()));
            assert!(errors.iter().all(|e| e.code == Some(PARSE_ERROR_CODE)));
        }
        LintOutcome::Analyzed(diagnostics) => panic!("unexpected analysis: {:?}", diagnostics),
    }
}

#[test]
fn lexical_error_prevents_analysis() {
    let source = "el.addEventListener('click, f);";
    assert!(matches!(
        lint_source(source, "broken.js"),
        LintOutcome::SyntaxErrors(_)
    ));
}

#[test]
fn each_unit_starts_with_an_empty_ledger() {
    let first = "document.addEventListener('click', f);";
    let second = "document.removeEventListener('click', f);";
    assert_eq!(messages(first), vec![unmatched("click", "document", "f")]);
    assert_eq!(messages(second), vec![orphan("document", "click", "f")]);
}
