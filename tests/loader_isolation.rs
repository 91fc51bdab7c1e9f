mod common;

use std::sync::Arc;

use assemblage::{
    AssemblyFactory, ComponentLoader, DefaultHandlerRegistry, Error, IsolatedInvoker, Resource,
    ambient_loader, load_context,
};
use common::KeyedStore;

const DOCUMENT: &str = r#"
    namespace = "urn:assemblage:core"

    [store]
    kind = "keyed-store"
"#;

#[test]
fn factory_assembly_survives_a_hostile_ambient_binding() {
    // The surrounding host has installed a loader that knows none of the
    // document's kinds; the factory's own isolation overrides it.
    let hostile = IsolatedInvoker::new(Arc::new(ComponentLoader::new()));
    let factory = AssemblyFactory::new(common::test_loader());

    let store = hostile
        .run(|| factory.create_single::<KeyedStore>(Resource::bytes(DOCUMENT)))
        .unwrap();
    store.add("alpha");
    assert_eq!(store.len(), 1);
}

#[test]
fn bare_refresh_resolves_through_the_ambient_binding() {
    let registry = DefaultHandlerRegistry::new();
    let mut context = load_context(
        &Resource::bytes(DOCUMENT),
        &registry,
        common::test_loader(),
    )
    .unwrap();

    let hostile = IsolatedInvoker::new(Arc::new(ComponentLoader::new()));
    let err = hostile.run(|| context.refresh(false)).unwrap_err();
    assert!(matches!(err, Error::Assembly { .. }));
    assert!(err.to_string().contains("no constructor registered"));
}

#[test]
fn refresh_falls_back_to_the_bound_loader_without_a_binding() {
    let registry = DefaultHandlerRegistry::new();
    let mut context = load_context(
        &Resource::bytes(DOCUMENT),
        &registry,
        common::test_loader(),
    )
    .unwrap();

    assert!(ambient_loader().is_none());
    context.refresh(false).unwrap();
    assert!(context.get::<KeyedStore>("store").is_some());
}

#[test]
fn bindings_nest_and_restore() {
    let outer_loader = common::test_loader();
    let inner_loader = Arc::new(ComponentLoader::new());

    let outer = IsolatedInvoker::new(outer_loader.clone());
    let inner = IsolatedInvoker::new(inner_loader.clone());

    assert!(ambient_loader().is_none());
    outer.run(|| {
        assert!(Arc::ptr_eq(&ambient_loader().unwrap(), &outer_loader));
        inner.run(|| {
            assert!(Arc::ptr_eq(&ambient_loader().unwrap(), &inner_loader));
        });
        assert!(Arc::ptr_eq(&ambient_loader().unwrap(), &outer_loader));
    });
    assert!(ambient_loader().is_none());
}

#[test]
fn binding_is_restored_on_unwind() {
    let invoker = IsolatedInvoker::new(common::test_loader());
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        invoker.run(|| panic!("work exploded"));
    }));
    assert!(outcome.is_err());
    assert!(ambient_loader().is_none());
}
