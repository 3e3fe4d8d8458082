use std::{cell::RefCell, rc::Rc};

use tdelegate::{Delegate, DelegateError, EntryKind};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::TRACE.into())
                .from_env_lossy(),
        )
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct Button {
    clicks: Vec<(u32, u32)>,
}

impl Button {
    fn on_click(&mut self, x: u32, y: u32) {
        self.clicks.push((x, y));
    }
}

#[test]
fn event_subscribers() {
    init_tracing();

    let first = Rc::new(RefCell::new(Button::default()));
    let second = Rc::new(RefCell::new(Button::default()));

    let mut clicked: Delegate<fn(u32, u32)> = Delegate::new();
    clicked.add_method_mut(&first, Button::on_click);
    clicked.add_method_mut(&second, Button::on_click);

    clicked.invoke(1, 2).unwrap();
    assert!(clicked.remove_method_mut(&first, Button::on_click));
    clicked.invoke(3, 4).unwrap();

    assert_eq!(first.borrow().clicks, [(1, 2)]);
    assert_eq!(second.borrow().clicks, [(1, 2), (3, 4)]);

    drop(second);
    assert_eq!(clicked.invoke(5, 6), Err(DelegateError::TargetDropped));

    clicked.clear();
    assert_eq!(clicked.invoke(5, 6), Err(DelegateError::Empty));
}

#[test]
fn composed_delegates() {
    init_tracing();

    fn square(x: i64) -> i64 {
        x * x
    }

    let mut base: Delegate<fn(i64) -> i64> = Delegate::new();
    base.add_fn(Some(square));

    let mut composed = base.clone();
    composed.add_delegate(base.clone());
    composed.add(|x: i64| -x);

    let kinds: Vec<EntryKind> = composed.iter().map(|entry| entry.kind()).collect();
    assert_eq!(kinds, [EntryKind::Value, EntryKind::Nested, EntryKind::Value]);

    assert_eq!(composed.invoke_all(3), Ok(vec![9, 9, -3]));
    assert_eq!(composed.invoke(3), Ok(-3));

    assert!(composed.remove_delegate(&base));
    assert!(!composed.remove_delegate(&base));
    assert_eq!(composed.len(), 2);
}
