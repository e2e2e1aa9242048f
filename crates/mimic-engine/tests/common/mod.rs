//! Shared fixtures: a described class with properties, methods, indexers and
//! an event, plus interfaces it satisfies without declaring them.

#![allow(dead_code)]

use mimic_engine::{
    arg, Access, FromValue, HandlerRef, InterfaceBuilder, ObjectRef, ProxyResult, TypeBuilder,
    TypeDesc, TypeModule, TypeRef, Value,
};
use parking_lot::Mutex;

pub struct DummyClass {
    read_only: String,
    writable: Mutex<Option<String>>,
    write_only: Mutex<String>,
    value: Mutex<i32>,
    value_type: Mutex<i32>,
    index_value: Mutex<String>,
    another_index_value: Mutex<i32>,
    handlers: Mutex<Vec<HandlerRef>>,
}

impl DummyClass {
    pub fn new(read_only: &str) -> Self {
        DummyClass {
            read_only: read_only.to_string(),
            writable: Mutex::new(None),
            write_only: Mutex::new(String::new()),
            value: Mutex::new(0),
            value_type: Mutex::new(0),
            index_value: Mutex::new("IndexValue".to_string()),
            another_index_value: Mutex::new(0),
            handlers: Mutex::new(Vec::new()),
        }
    }

    fn raise(&self, payload: Value) {
        let handlers = self.handlers.lock().clone();
        for handler in handlers {
            handler.call(&[payload.clone()]);
        }
    }
}

fn set_i32(cell: &Mutex<i32>, value: Value) -> ProxyResult<()> {
    *cell.lock() = i32::from_value(&value)?;
    Ok(())
}

pub fn dummy_type() -> TypeRef {
    TypeBuilder::<DummyClass>::class("DummyClass")
        .property(
            "WritableProperty",
            TypeDesc::Str,
            |d| Ok(d.writable.lock().clone().into()),
            |d, v| {
                *d.writable.lock() = Option::<String>::from_value(&v)?;
                Ok(())
            },
        )
        .readonly_property("ReadOnlyProperty", TypeDesc::Str, |d| {
            Ok(d.read_only.as_str().into())
        })
        .writeonly_property("WriteOnlyProperty", TypeDesc::Str, |d, v| {
            *d.write_only.lock() = String::from_value(&v)?;
            Ok(())
        })
        .property(
            "ValueProperty",
            TypeDesc::I32,
            |d| Ok(Value::I32(*d.value.lock())),
            |d, v| set_i32(&d.value, v),
        )
        .property(
            "WritableValueTypeProperty",
            TypeDesc::I32,
            |d| Ok(Value::I32(*d.value_type.lock())),
            |d, v| set_i32(&d.value_type, v),
        )
        .method(
            "GetStringValue",
            [TypeDesc::Any, TypeDesc::I32],
            TypeDesc::Str,
            |_, args| {
                let another: i32 = arg(args, 1)?;
                Ok(format!("{} - {}", args[0], another).into())
            },
        )
        .method("GetInt", [TypeDesc::I32], TypeDesc::I32, |_, args| {
            Ok(Value::I32(arg(args, 0)?))
        })
        .method("Statement", [], TypeDesc::Void, |_, _| Ok(Value::Unit))
        .method("FireSomeEvent", [TypeDesc::Str], TypeDesc::Void, |d, args| {
            d.raise(args[0].clone());
            Ok(Value::Unit)
        })
        .non_public()
        .method("Secret", [], TypeDesc::Str, |_, _| Ok("hidden".into()))
        .indexer(
            [TypeDesc::I32],
            TypeDesc::Str,
            |d, _| Ok(d.index_value.lock().as_str().into()),
            |d, indexes, v| {
                let text = String::from_value(&v)?;
                *d.index_value.lock() = format!("{} - {}", indexes[0], text);
                Ok(())
            },
        )
        .indexer(
            [TypeDesc::Str],
            TypeDesc::Str,
            |d, _| Ok(d.index_value.lock().as_str().into()),
            |d, indexes, v| {
                let text = String::from_value(&v)?;
                *d.index_value.lock() = format!("{} - {}", indexes[0], text);
                Ok(())
            },
        )
        .indexer(
            [TypeDesc::I32, TypeDesc::I32],
            TypeDesc::I32,
            |d, indexes| {
                let (a, b): (i32, i32) = (arg(indexes, 0)?, arg(indexes, 1)?);
                Ok(Value::I32(a + b + *d.another_index_value.lock()))
            },
            |d, indexes, v| {
                let (a, b): (i32, i32) = (arg(indexes, 0)?, arg(indexes, 1)?);
                *d.another_index_value.lock() = a + b + i32::from_value(&v)?;
                Ok(())
            },
        )
        .event(
            "SomeEvent",
            |d, handler| {
                d.handlers.lock().push(handler);
                Ok(())
            },
            |d, handler| {
                let mut handlers = d.handlers.lock();
                if let Some(pos) = handlers.iter().position(|h| *h == handler) {
                    handlers.remove(pos);
                }
                Ok(())
            },
        )
        .build()
        .unwrap()
}

pub fn dummy(read_only: &str) -> Value {
    ObjectRef::new(&dummy_type(), DummyClass::new(read_only))
        .unwrap()
        .into()
}

pub struct DummyClass2;

pub fn dummy2() -> Value {
    let ty = TypeBuilder::<DummyClass2>::class("DummyClass2")
        .method("GetInt", [TypeDesc::I32], TypeDesc::I32, |_, args| {
            Ok(Value::I32(arg(args, 0)?))
        })
        .build()
        .unwrap();
    ObjectRef::new(&ty, DummyClass2).unwrap().into()
}

pub fn i_dummy_properties() -> TypeRef {
    InterfaceBuilder::new("IDummyProperties")
        .property("WritableProperty", TypeDesc::Str, Access::ReadWrite)
        .property("ReadOnlyProperty", TypeDesc::Str, Access::Read)
        .property("ValueProperty", TypeDesc::I32, Access::ReadWrite)
        .build()
        .unwrap()
}

pub fn i_dummy_write_only() -> TypeRef {
    InterfaceBuilder::new("IDummyWriteOnly")
        .property("WriteOnlyProperty", TypeDesc::Str, Access::Write)
        .build()
        .unwrap()
}

pub fn i_dummy_methods() -> TypeRef {
    InterfaceBuilder::new("IDummyMethods")
        .method("GetStringValue", [TypeDesc::Any, TypeDesc::I32], TypeDesc::Str)
        .method("GetInt", [TypeDesc::I32], TypeDesc::I32)
        .method("Statement", [], TypeDesc::Void)
        .build()
        .unwrap()
}

pub fn i_dummy_events() -> TypeRef {
    InterfaceBuilder::new("IDummyEvents")
        .event("SomeEvent")
        .build()
        .unwrap()
}

pub fn i_dummy_index() -> TypeRef {
    InterfaceBuilder::new("IDummyIndex")
        .indexer([TypeDesc::I32], TypeDesc::Str, Access::ReadWrite)
        .indexer([TypeDesc::Str], TypeDesc::Str, Access::ReadWrite)
        .indexer([TypeDesc::I32, TypeDesc::I32], TypeDesc::I32, Access::ReadWrite)
        .build()
        .unwrap()
}

pub fn i_disposable() -> TypeRef {
    InterfaceBuilder::new("IDisposable")
        .method("Dispose", [], TypeDesc::Void)
        .build()
        .unwrap()
}

/// Module serving `DummyClass`, constructed from its read-only value
pub fn dummy_module() -> TypeModule {
    let mut module = TypeModule::new("dummies", "1.0.0");
    let ty = dummy_type();
    let descriptor = ty.clone();
    module.register_type(&ty, move |args| {
        let read_only: String = arg(args, 0)?;
        Ok(ObjectRef::new(&descriptor, DummyClass::new(&read_only))?.into())
    });
    module
}
