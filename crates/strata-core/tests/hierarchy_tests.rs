use std::fs;
use std::path::Path;

use strata_core::{AstIndex, ClassRef, ParserManager, QueryEngine};
use tempfile::TempDir;

fn build(files: &[(&str, &str)]) -> (TempDir, AstIndex) {
    let dir = TempDir::new().unwrap();
    for (name, src) in files {
        let path = dir.path().join(name);
        if let Some(parent) = Path::new(&path).parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, src).unwrap();
    }
    let index = ParserManager::new().build_index_from_dir(dir.path()).unwrap();
    (dir, index)
}

fn names(refs: &[ClassRef]) -> Vec<String> {
    let mut names: Vec<String> = refs.iter().map(ClassRef::qualified).collect();
    names.sort();
    names
}

#[test]
fn test_transitive_across_files_and_packages() {
    let (_dir, index) = build(&[
        ("a/A.java", "package a; import b.B; public class A extends B {}"),
        ("b/B.java", "package b; public class B extends C {}"),
        ("b/C.java", "package b; public abstract class C {}"),
    ]);
    let engine = QueryEngine::new(&index);

    assert_eq!(names(&engine.super_classes("a.A")), vec!["b.B", "b.C"]);
    assert_eq!(names(&engine.sub_classes("b.C")), vec!["a.A", "b.B"]);
    assert!(engine.super_classes("b.C").is_empty());
}

#[test]
fn test_diamond_interfaces() {
    let (_dir, index) = build(&[(
        "Shapes.java",
        "package s;
         interface A {}
         interface B extends A {}
         interface C extends A {}
         class D implements B, C {}",
    )]);
    let engine = QueryEngine::new(&index);

    assert_eq!(names(&engine.sub_classes("A")), vec!["s.B", "s.C", "s.D"]);
    assert_eq!(names(&engine.super_classes("D")), vec!["s.A", "s.B", "s.C"]);
}

#[test]
fn test_external_super_has_no_subclasses() {
    let (_dir, index) = build(&[(
        "L.java",
        "package p; import java.util.ArrayList; class L extends ArrayList<String> {}",
    )]);
    let engine = QueryEngine::new(&index);

    assert_eq!(
        engine.super_classes("p.L"),
        vec![ClassRef::new("java.util", "ArrayList")]
    );
    assert!(engine.sub_classes("java.util.ArrayList").is_empty());
    assert!(engine.sub_classes("ArrayList").is_empty());
}

#[test]
fn test_cyclic_declarations_terminate() {
    let (_dir, index) = build(&[(
        "Cycle.java",
        "package c; class X extends Y {} class Y extends Z {} class Z extends X {}",
    )]);
    let engine = QueryEngine::new(&index);

    let supers = names(&engine.super_classes("c.X"));
    assert_eq!(supers, vec!["c.Y", "c.Z"]);
    assert!(!supers.contains(&"c.X".to_string()));
    assert!(!names(&engine.sub_classes("c.X")).contains(&"c.X".to_string()));
}

#[test]
fn test_simple_name_queries_merge_packages() {
    let (_dir, index) = build(&[
        ("one/Base.java", "package one; class Base {} class Left extends Base {}"),
        ("two/Base.java", "package two; class Base {} class Right extends Base {}"),
    ]);
    let engine = QueryEngine::new(&index);

    assert_eq!(names(&engine.sub_classes("Base")), vec!["one.Left", "two.Right"]);
    assert_eq!(names(&engine.sub_classes("one.Base")), vec!["one.Left"]);
}

#[test]
fn test_inner_class_hierarchy() {
    let (_dir, index) = build(&[(
        "Outer.java",
        "package p; class Base {} class Outer { static class Inner extends Base {} }",
    )]);
    let engine = QueryEngine::new(&index);

    assert_eq!(
        engine.sub_classes("p.Base"),
        vec![ClassRef::new("p", "Outer$Inner")]
    );
    assert_eq!(engine.super_classes("p.Outer$Inner"), vec![ClassRef::new("p", "Base")]);
}

#[test]
fn test_nested_super_in_same_file() {
    let (_dir, index) = build(&[(
        "Outer.java",
        "package p;
         class Base {}
         class Outer {
             static class Inner extends Base {}
             static class Sub extends Inner {}
         }",
    )]);
    let engine = QueryEngine::new(&index);

    assert_eq!(
        engine.super_classes("p.Outer$Sub"),
        vec![ClassRef::new("p", "Outer$Inner"), ClassRef::new("p", "Base")]
    );
    assert_eq!(names(&engine.sub_classes("p.Outer$Inner")), vec!["p.Outer$Sub"]);
    assert_eq!(names(&engine.sub_classes("p.Base")), vec!["p.Outer$Inner", "p.Outer$Sub"]);
}

#[test]
fn test_imported_nested_super() {
    let (_dir, index) = build(&[
        ("p/Outer.java", "package p; public class Outer { public static class Inner {} }"),
        ("q/X.java", "package q; import p.Outer.Inner; class X extends Inner {}"),
        ("q/Y.java", "package q; import p.Outer; class Y extends Outer.Inner {}"),
    ]);
    let engine = QueryEngine::new(&index);

    assert_eq!(engine.super_classes("q.X"), vec![ClassRef::new("p", "Outer$Inner")]);
    assert_eq!(engine.super_classes("q.Y"), vec![ClassRef::new("p", "Outer$Inner")]);
    assert_eq!(names(&engine.sub_classes("Inner")), vec!["q.X", "q.Y"]);
}
