//! Integration tests for module sources and adapter manifests

mod common;

use std::path::Path;

use common::*;
use mimic_engine::{
    load_manifest, AdapterSynthesizer, DylibSource, DynamicFacade, LoadError, ModuleSource,
    ProxyError, StaticSource, Value,
};

mod static_modules {
    use super::*;

    fn source() -> StaticSource {
        let source = StaticSource::new();
        source.register("lib/dummies", dummy_module());
        source
    }

    #[test]
    fn test_facade_from_module() {
        let proxy = DynamicFacade::from_module(
            &source(),
            "lib/dummies",
            "DummyClass",
            &[Value::from("FromModule")],
        )
        .unwrap();
        assert_eq!(proxy.target_type().name(), "DummyClass");
        assert_eq!(
            proxy.get_member("ReadOnlyProperty").unwrap(),
            Value::from("FromModule")
        );
    }

    #[test]
    fn test_unknown_type() {
        let err = DynamicFacade::from_module(&source(), "lib/dummies", "Missing", &[]).unwrap_err();
        assert_eq!(
            err,
            ProxyError::TypeNotFound {
                type_name: "Missing".to_string(),
                module: "dummies".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_path() {
        let err =
            DynamicFacade::from_module(&source(), "lib/other", "DummyClass", &[]).unwrap_err();
        assert!(matches!(err, ProxyError::Load(_)));
    }

    #[test]
    fn test_constructor_arguments_checked() {
        let err =
            DynamicFacade::from_module(&source(), "lib/dummies", "DummyClass", &[]).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidArguments(_)));
    }
}

mod shared_libraries {
    use super::*;

    #[test]
    fn test_missing_library() {
        let source = DylibSource::new();
        assert!(matches!(
            source.load(Path::new("/nonexistent/libdummies.so")),
            Err(LoadError::NotFound { .. })
        ));
        assert!(matches!(
            DynamicFacade::from_module(&source, "/nonexistent/libdummies.so", "DummyClass", &[]),
            Err(ProxyError::Load(_))
        ));
    }
}

mod manifests {
    use super::*;

    #[test]
    fn test_manifest_lists_every_adapter() {
        let synthesizer = AdapterSynthesizer::new();
        for interface in [i_dummy_methods(), i_dummy_index(), i_dummy_events()] {
            synthesizer.adapt(&interface, dummy("")).unwrap();
        }

        let dir = tempfile::tempdir().unwrap();
        let path = synthesizer.save_manifest(dir.path()).unwrap();
        let manifest = load_manifest(&path).unwrap();

        let names: Vec<&str> = manifest.adapters.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["IDummyEventsAdapter", "IDummyIndexAdapter", "IDummyMethodsAdapter"]
        );
        let methods = manifest.adapter_for("IDummyMethods").unwrap();
        assert_eq!(methods.slots.len(), 3);
        assert_eq!(methods.slots[0].params, vec!["object", "i32"]);
        assert_eq!(manifest.adapter_for("IDummyIndex").unwrap().slots.len(), 3);
    }

    #[test]
    fn test_mismatch_leaves_manifest_empty() {
        let synthesizer = AdapterSynthesizer::new();
        assert!(synthesizer.adapt(&i_disposable(), Value::from("")).is_err());
        assert!(synthesizer.manifest().adapters.is_empty());
    }

    #[test]
    fn test_explicit_file_path() {
        let synthesizer = AdapterSynthesizer::new();
        synthesizer.adapt(&i_dummy_properties(), dummy("")).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("adapters.json");
        assert_eq!(synthesizer.save_manifest(&file).unwrap(), file);
        assert_eq!(load_manifest(&file).unwrap(), synthesizer.manifest());
    }
}
