//! Integration tests for pipeline data flow
//!
//! Drives assembled pipelines with scripted sources and recording sinks to
//! pin down the per-envelope state machine: unconditional raw fan-out,
//! per-stage decoded fan-out, drop semantics, the two error tiers, and
//! response forwarding.

use flowpipe::{
    ConfigStore, Decoded, Envelope, EnvelopeHandler, Error, Pipeline, PluginConfig, Registry,
    Responder, Result, Sink, Source, Transform,
};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// Source that emits a fixed list of envelopes, then returns.
struct Script {
    items: Vec<Envelope>,
    responses: Option<Rc<RefCell<Vec<Envelope>>>>,
}

impl Script {
    fn new(items: &[&str]) -> Self {
        Self {
            items: items.iter().map(|s| Envelope::Text(s.to_string())).collect(),
            responses: None,
        }
    }

    fn responsive(items: &[&str], responses: Rc<RefCell<Vec<Envelope>>>) -> Self {
        Self {
            responses: Some(responses),
            ..Self::new(items)
        }
    }
}

impl Source for Script {
    fn run(&mut self, handler: &mut dyn EnvelopeHandler) -> Result<()> {
        for item in self.items.drain(..) {
            handler.on_envelope(item)?;
        }
        Ok(())
    }

    fn responder(&self) -> Option<Responder> {
        let sink = self.responses.as_ref()?.clone();
        Some(Box::new(move |response: &Envelope| {
            sink.borrow_mut().push(response.clone());
            Ok(())
        }))
    }
}

/// Sink recording every dispatch it receives.
#[derive(Default)]
struct Recording {
    raw: Rc<RefCell<Vec<Envelope>>>,
    decoded: Rc<RefCell<Vec<Envelope>>>,
}

impl Recording {
    fn share(&self) -> (Rc<RefCell<Vec<Envelope>>>, Rc<RefCell<Vec<Envelope>>>) {
        (self.raw.clone(), self.decoded.clone())
    }
}

impl Sink for Recording {
    fn handle_raw(&mut self, envelope: &Envelope) -> Result<()> {
        self.raw.borrow_mut().push(envelope.clone());
        Ok(())
    }

    fn handle_decoded(&mut self, envelope: &Envelope) -> Result<()> {
        self.decoded.borrow_mut().push(envelope.clone());
        Ok(())
    }
}

/// Transform mapping text payloads through a function.
struct Map(fn(Envelope) -> Result<Decoded>);

impl Transform for Map {
    fn decode(&mut self, envelope: Envelope) -> Result<Decoded> {
        (self.0)(envelope)
    }
}

fn identity(envelope: Envelope) -> Result<Decoded> {
    Ok(Decoded::Continue(envelope))
}

fn drop_all(_envelope: Envelope) -> Result<Decoded> {
    Ok(Decoded::Drop)
}

/// Fails on payload "e2"; recoverable or fatal depending on the flag.
struct FailOnE2 {
    recoverable: bool,
}

impl Transform for FailOnE2 {
    fn decode(&mut self, envelope: Envelope) -> Result<Decoded> {
        if envelope.to_string() == "e2" {
            return if self.recoverable {
                Err(Error::Recoverable("cannot process e2".into()))
            } else {
                Err(Error::Plugin("broken on e2".into()))
            };
        }
        Ok(Decoded::Continue(envelope))
    }
}

fn texts(items: &[&str]) -> Vec<Envelope> {
    items.iter().map(|s| Envelope::Text(s.to_string())).collect()
}

#[test]
fn raw_fan_out_reaches_every_sink_once_per_envelope_in_order() {
    let sink_a = Recording::default();
    let sink_b = Recording::default();
    let (raw_a, _) = sink_a.share();
    let (raw_b, _) = sink_b.share();

    let mut pipeline = Pipeline::new(
        Box::new(Script::new(&["e1", "e2", "e3"])),
        vec![Box::new(FailOnE2 { recoverable: true })],
        vec![Box::new(sink_a), Box::new(sink_b)],
    );
    pipeline.run().unwrap();

    // Raw observability is independent of decode outcomes.
    assert_eq!(*raw_a.borrow(), texts(&["e1", "e2", "e3"]));
    assert_eq!(*raw_b.borrow(), texts(&["e1", "e2", "e3"]));
}

#[test]
fn dropping_stage_truncates_chain_after_earlier_dispatch() {
    let sink = Recording::default();
    let (_, decoded) = sink.share();

    let mut pipeline = Pipeline::new(
        Box::new(Script::new(&["e1"])),
        vec![Box::new(Map(identity)), Box::new(Map(drop_all))],
        vec![Box::new(sink)],
    );
    pipeline.run().unwrap();

    // One dispatch after the identity stage; the dropping stage adds none.
    assert_eq!(*decoded.borrow(), texts(&["e1"]));
}

#[test]
fn empty_result_is_treated_as_drop() {
    let sink = Recording::default();
    let (_, decoded) = sink.share();

    fn blank(_envelope: Envelope) -> Result<Decoded> {
        Ok(Decoded::Continue(Envelope::Text(String::new())))
    }

    let mut pipeline = Pipeline::new(
        Box::new(Script::new(&["e1"])),
        vec![Box::new(Map(blank)), Box::new(Map(identity))],
        vec![Box::new(sink)],
    );
    pipeline.run().unwrap();

    assert!(decoded.borrow().is_empty());
}

#[test]
fn recoverable_error_skips_one_envelope_only() {
    let sink = Recording::default();
    let (raw, decoded) = sink.share();

    let mut pipeline = Pipeline::new(
        Box::new(Script::new(&["e1", "e2", "e3"])),
        vec![
            Box::new(FailOnE2 { recoverable: true }),
            Box::new(Map(identity)),
        ],
        vec![Box::new(sink)],
    );
    pipeline.run().unwrap();

    assert_eq!(*raw.borrow(), texts(&["e1", "e2", "e3"]));
    // e1 and e3 pass both stages (two dispatches each); e2 passes none.
    assert_eq!(*decoded.borrow(), texts(&["e1", "e1", "e3", "e3"]));
}

#[test]
fn fatal_error_terminates_the_run() {
    let sink = Recording::default();
    let (raw, decoded) = sink.share();

    let mut pipeline = Pipeline::new(
        Box::new(Script::new(&["e1", "e2", "e3"])),
        vec![Box::new(FailOnE2 { recoverable: false })],
        vec![Box::new(sink)],
    );
    let err = pipeline.run().unwrap_err();
    assert!(!err.is_recoverable());

    // e3 was never produced: the failure propagated into the source loop.
    assert_eq!(*raw.borrow(), texts(&["e1", "e2"]));
    assert_eq!(*decoded.borrow(), texts(&["e1"]));
}

#[test]
fn every_intermediate_stage_fans_out() {
    let sink = Recording::default();
    let (_, decoded) = sink.share();

    fn exclaim(envelope: Envelope) -> Result<Decoded> {
        Ok(Decoded::Continue(Envelope::Text(format!("{}!", envelope))))
    }

    let mut pipeline = Pipeline::new(
        Box::new(Script::new(&["a"])),
        vec![Box::new(Map(exclaim)), Box::new(Map(exclaim)), Box::new(Map(exclaim))],
        vec![Box::new(sink)],
    );
    pipeline.run().unwrap();

    assert_eq!(*decoded.borrow(), texts(&["a!", "a!!", "a!!!"]));
}

#[test]
fn responses_reach_a_responsive_source() {
    let responses = Rc::new(RefCell::new(Vec::new()));
    let sink = Recording::default();

    struct Ack;
    impl Transform for Ack {
        fn decode(&mut self, envelope: Envelope) -> Result<Decoded> {
            Ok(Decoded::Continue(envelope))
        }
        fn take_response(&mut self) -> Option<Envelope> {
            Some(Envelope::Text("ack".into()))
        }
    }

    let mut pipeline = Pipeline::new(
        Box::new(Script::responsive(&["e1", "e2"], responses.clone())),
        vec![Box::new(Ack)],
        vec![Box::new(sink)],
    );
    pipeline.run().unwrap();

    // One response per envelope per responding stage.
    assert_eq!(*responses.borrow(), texts(&["ack", "ack"]));
}

#[test]
fn responses_are_silently_ignored_without_a_responder() {
    struct Ack;
    impl Transform for Ack {
        fn decode(&mut self, envelope: Envelope) -> Result<Decoded> {
            Ok(Decoded::Continue(envelope))
        }
        fn take_response(&mut self) -> Option<Envelope> {
            Some(Envelope::Text("ack".into()))
        }
    }

    let mut pipeline = Pipeline::new(
        Box::new(Script::new(&["e1"])),
        vec![Box::new(Ack)],
        vec![Box::new(Recording::default())],
    );
    assert!(pipeline.run().is_ok());
}

#[test]
fn empty_decode_list_means_identity_pass_through() {
    let sink = Recording::default();
    let (raw, decoded) = sink.share();

    let mut pipeline = Pipeline::new(
        Box::new(Script::new(&["e1", "e2"])),
        Vec::new(),
        vec![Box::new(sink)],
    );
    pipeline.run().unwrap();

    // No decode stages: raw dispatch still happens, decoded never does.
    assert_eq!(*raw.borrow(), texts(&["e1", "e2"]));
    assert!(decoded.borrow().is_empty());
}

// --- assembly from configuration -----------------------------------------

fn test_registry(decoded: Rc<RefCell<Vec<Envelope>>>) -> Registry {
    let mut registry = Registry::builtin();
    registry.register_sink("recorder", move |_config: PluginConfig| {
        let sink = Recording {
            decoded: decoded.clone(),
            ..Recording::default()
        };
        Ok(Box::new(sink) as Box<dyn Sink>)
    });
    registry
}

#[test]
fn example_scenario_counts_one_raw_and_two_decoded_dispatches() {
    let mut input = tempfile::NamedTempFile::new().unwrap();
    write!(input, "hello\n").unwrap();

    let mut store = ConfigStore::load(None);
    store.apply_overrides(&[
        "plugins.input=fileread".to_string(),
        "plugins.decode=noop,uppercase".to_string(),
        "plugins.output=recorder".to_string(),
        format!("fileread.filename={}", input.path().display()),
    ]);

    let decoded = Rc::new(RefCell::new(Vec::new()));
    let registry = test_registry(decoded.clone());
    let mut pipeline = Pipeline::from_config(&mut store, &registry, "info").unwrap();
    pipeline.run().unwrap();

    // noop forwards "hello", uppercase forwards "HELLO"; two decoded
    // dispatches for one raw line.
    assert_eq!(*decoded.borrow(), texts(&["hello", "HELLO"]));
}

#[test]
fn assembly_fails_fast_on_unknown_plugin() {
    let mut store = ConfigStore::load(None);
    store.apply_overrides(&["plugins.decode=nosuchthing"]);

    let registry = Registry::builtin();
    let err = Pipeline::from_config(&mut store, &registry, "info").unwrap_err();
    assert!(matches!(err, Error::Resolve(_)));
}

#[test]
fn assembly_injects_loglevel_into_plugin_sections() {
    let mut store = ConfigStore::load(None);
    store.apply_overrides(&["plugins.output=counter", "counter.loglevel=trace"]);

    let registry = Registry::builtin();
    Pipeline::from_config(&mut store, &registry, "debug").unwrap();
    assert_eq!(store.get("counter", "loglevel").unwrap(), "debug");
    assert_eq!(store.get("fileread", "loglevel").unwrap(), "debug");
}
