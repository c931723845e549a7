use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Result;
use rmistub::filer::{DependencyManifest, Filer, FsFiler, Origin, Resource, resource_path};
use rmistub::lexer::tokenize;
use rmistub::parser::parse;
use rmistub::processor::{MarkerTable, Processor, Round, SourceUnit};
use rmistub::stub::{
    EmitError, JsonSerializer, RemoteClass, RemoteMethod, ScriptSerializer, StubBuilder,
    StubSerializer,
};

fn temp_output_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("rmistub-builder-test")
        .tempdir()
        .expect("failed to create temp dir")
}

fn round(sources: &[(&str, &str)]) -> Round {
    let units = sources
        .iter()
        .map(|(path, source)| {
            let tokens = tokenize(source).expect("tokenization should succeed");
            let unit = parse(&tokens).expect("parsing should succeed");
            SourceUnit::new(*path, *source, unit)
        })
        .collect();
    Round::new(units)
}

fn sample_class(qualified_name: &str) -> RemoteClass {
    let mut class = RemoteClass::new(qualified_name);
    let mut method = RemoteMethod::new("ping", "java.lang.String");
    method.add_parameter("int", "count");
    class.add_method(method);
    class
}

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct FailingWriter {
    fail_write: bool,
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_write {
            Err(io::Error::other("disk full"))
        } else {
            Ok(buf.len())
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::other("flush refused"))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Fault {
    Create,
    Write,
    Close,
}

/// In-memory filer that injects a fault for one file name.
#[derive(Default)]
struct MemoryFiler {
    files: Vec<(PathBuf, SharedBuffer)>,
    faults: Vec<(String, Fault)>,
    discarded: Vec<PathBuf>,
}

impl MemoryFiler {
    fn failing(file_name: &str, fault: Fault) -> Self {
        Self {
            faults: vec![(file_name.to_string(), fault)],
            ..Self::default()
        }
    }

    fn file(&self, path: &str) -> Option<String> {
        self.files
            .iter()
            .find(|(location, _)| location.to_string_lossy() == path)
            .map(|(_, buffer)| buffer.contents())
    }
}

impl Filer for MemoryFiler {
    fn create_resource(
        &mut self,
        package: &str,
        file_name: &str,
        _origin: &Origin,
    ) -> io::Result<Resource> {
        let location = resource_path(package, file_name);
        let fault = self
            .faults
            .iter()
            .find(|(name, _)| name == file_name)
            .map(|(_, fault)| *fault);
        match fault {
            Some(Fault::Create) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "read-only output",
            )),
            Some(Fault::Write) => Ok(Resource::new(
                location,
                Box::new(FailingWriter { fail_write: true }),
            )),
            Some(Fault::Close) => Ok(Resource::new(
                location,
                Box::new(FailingWriter { fail_write: false }),
            )),
            None => {
                let buffer = SharedBuffer::default();
                self.files.push((location.clone(), buffer.clone()));
                Ok(Resource::new(location, Box::new(buffer)))
            }
        }
    }

    fn discard(&mut self, location: &Path) {
        self.discarded.push(location.to_path_buf());
    }
}

/// Serializer that gives up halfway through the artifact.
struct TruncatingSerializer;

impl StubSerializer for TruncatingSerializer {
    fn extension(&self) -> &str {
        "js"
    }

    fn serialize(&self, class: &RemoteClass, writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "// {}", class.qualified_name())?;
        Err(io::Error::other("serializer gave up"))
    }
}

#[test]
fn emits_one_artifact_under_the_package_directory() {
    let mut filer = MemoryFiler::default();
    let serializer = ScriptSerializer::default();
    let class = sample_class("com.example.Foo");
    let origin = Origin::new("com.example.Foo", "com/example/Foo.java");

    let emission = StubBuilder::new(&mut filer, &serializer).emit(&class, &origin);

    assert!(emission.is_ok());
    assert_eq!(
        emission.location,
        Some(PathBuf::from("com").join("example").join("Foo.js"))
    );
    let contents = filer
        .file(&resource_path("com.example", "Foo.js").to_string_lossy())
        .expect("artifact written");
    assert!(contents.contains("com.example.Foo = {"));
}

#[test]
fn create_failure_is_captured() {
    let mut filer = MemoryFiler::failing("Foo.json", Fault::Create);
    let serializer = JsonSerializer::default();

    let emission = StubBuilder::new(&mut filer, &serializer)
        .emit(&sample_class("a.Foo"), &Origin::new("a.Foo", "a/Foo.java"));

    assert!(emission.location.is_none());
    assert_eq!(emission.errors.len(), 1);
    match &emission.errors[0] {
        EmitError::Create {
            package,
            file_name,
            source,
        } => {
            assert_eq!(package, "a");
            assert_eq!(file_name, "Foo.json");
            assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
        }
        other => panic!("expected create error, got {other:?}"),
    }
}

#[test]
fn write_failure_still_closes_the_resource() {
    let mut filer = MemoryFiler::failing("Foo.js", Fault::Write);
    let serializer = ScriptSerializer::default();

    let emission = StubBuilder::new(&mut filer, &serializer)
        .emit(&sample_class("a.Foo"), &Origin::new("a.Foo", "a/Foo.java"));

    // the failing writer also refuses to flush, so both failures are recorded
    assert_eq!(emission.errors.len(), 2);
    assert!(matches!(emission.errors[0], EmitError::Write { .. }));
    assert!(matches!(emission.errors[1], EmitError::Close { .. }));
    assert_eq!(filer.discarded, [resource_path("a", "Foo.js")]);
}

#[test]
fn one_failing_class_does_not_stop_the_others() {
    let round = round(&[
        ("p/Alpha.java", "package p;\n@Remote interface Alpha { void a(); }\n"),
        ("p/Beta.java", "package p;\n@Remote interface Beta { void b(); }\n"),
        ("p/Gamma.java", "package p;\n@Remote interface Gamma { void c(); }\n"),
    ]);
    let mut filer = MemoryFiler::failing("Beta.js", Fault::Close);
    let serializer = ScriptSerializer::default();

    let report = Processor::new(MarkerTable::default(), &mut filer, &serializer).process(&round);

    assert_eq!(report.classes.len(), 3);
    assert!(report.has_failures());
    let failed: Vec<&str> = report
        .failed()
        .map(|class| class.qualified_name.as_str())
        .collect();
    assert_eq!(failed, ["p.Beta"]);
    let emitted: Vec<&str> = report
        .emitted()
        .map(|class| class.qualified_name.as_str())
        .collect();
    assert_eq!(emitted, ["p.Alpha", "p.Gamma"]);
    assert!(matches!(
        report.classes[1].errors[0],
        EmitError::Close { .. }
    ));

    assert!(filer.file("p/Alpha.js").is_some());
    assert!(filer.file("p/Gamma.js").is_some());
    assert_eq!(filer.discarded, [resource_path("p", "Beta.js")]);
}

#[test]
fn fs_filer_writes_files_and_refuses_duplicates() -> Result<()> {
    let out = temp_output_dir();
    let mut filer = FsFiler::new(out.path());
    let serializer = ScriptSerializer::default();
    let class = sample_class("com.example.Foo");
    let origin = Origin::new("com.example.Foo", "com/example/Foo.java");

    let first = StubBuilder::new(&mut filer, &serializer).emit(&class, &origin);
    assert!(first.is_ok());
    let path = out.path().join("com").join("example").join("Foo.js");
    assert_eq!(first.location.as_deref(), Some(path.as_path()));
    assert!(fs::read_to_string(&path)?.contains("rmi.setMethod(\"com.example.Foo\", \"ping\");"));

    let second = StubBuilder::new(&mut filer, &serializer).emit(&class, &origin);
    match &second.errors[..] {
        [EmitError::Create { source, .. }] => {
            assert_eq!(source.kind(), io::ErrorKind::AlreadyExists);
        }
        other => panic!("expected a single create error, got {other:?}"),
    }
    assert_eq!(filer.generated().len(), 1);
    Ok(())
}

#[test]
fn incomplete_artifacts_are_withdrawn_from_the_manifest() -> Result<()> {
    let out = temp_output_dir();
    let source_path = out.path().join("Foo.java");
    fs::write(&source_path, "@Remote interface Foo { void bar(); }\n")?;
    let origin = Origin::new("com.example.Foo", &source_path);
    let class = sample_class("com.example.Foo");
    let mut filer = FsFiler::new(out.path().join("rmi"));

    let emission = StubBuilder::new(&mut filer, &TruncatingSerializer).emit(&class, &origin);
    match &emission.errors[..] {
        [EmitError::Write { path, .. }] => assert!(!path.exists()),
        other => panic!("expected a single write error, got {other:?}"),
    }
    assert!(filer.generated().is_empty());

    let manifest = DependencyManifest::read_from_yaml(&filer.write_manifest("0.0.0")?)?;
    assert!(manifest.artifacts.is_empty());

    // still reserved: a second attempt in the same pass is refused
    let retry = StubBuilder::new(&mut filer, &ScriptSerializer::default()).emit(&class, &origin);
    assert!(matches!(retry.errors[..], [EmitError::Create { .. }]));
    Ok(())
}

#[test]
fn default_package_lands_in_the_output_root() -> Result<()> {
    let out = temp_output_dir();
    let mut filer = FsFiler::new(out.path());
    let serializer = JsonSerializer::default();

    let emission = StubBuilder::new(&mut filer, &serializer)
        .emit(&sample_class("Standalone"), &Origin::new("Standalone", "Standalone.java"));

    assert!(emission.is_ok());
    assert!(out.path().join("Standalone.json").is_file());
    Ok(())
}

#[test]
fn manifest_records_origins_and_fingerprints() -> Result<()> {
    let out = temp_output_dir();
    let source_path = out.path().join("Foo.java");
    fs::write(&source_path, "@Remote interface Foo { void bar(int x); }\n")?;

    let mut filer = FsFiler::new(out.path().join("rmi"));
    let serializer = ScriptSerializer::default();
    let origin = Origin::new("com.example.Foo", &source_path);
    let emission = StubBuilder::new(&mut filer, &serializer)
        .emit(&sample_class("com.example.Foo"), &origin);
    assert!(emission.is_ok());

    let manifest_path = filer.write_manifest("1.2.3")?;
    assert_eq!(
        manifest_path,
        out.path().join("rmi").join(DependencyManifest::FILE_NAME)
    );

    let manifest = DependencyManifest::read_from_yaml(&manifest_path)?;
    assert_eq!(manifest.generator_version, "1.2.3");
    assert_eq!(manifest.artifacts.len(), 1);

    let entry = &manifest.artifacts[0];
    assert_eq!(entry.element, "com.example.Foo");
    assert_eq!(entry.artifact, resource_path("com.example", "Foo.js"));
    let fingerprint = entry.fingerprint.as_deref().expect("source was hashed");
    assert_eq!(fingerprint.len(), 40);
    assert_eq!(manifest.artifacts_for(&source_path).count(), 1);
    Ok(())
}

#[test]
fn manifest_tolerates_missing_sources() -> Result<()> {
    let out = temp_output_dir();
    let mut filer = FsFiler::new(out.path());
    let serializer = ScriptSerializer::default();
    let origin = Origin::new("gone.Foo", out.path().join("missing.java"));
    StubBuilder::new(&mut filer, &serializer).emit(&sample_class("gone.Foo"), &origin);

    let manifest = DependencyManifest::read_from_yaml(&filer.write_manifest("0.0.0")?)?;
    assert_eq!(manifest.artifacts[0].fingerprint, None);
    Ok(())
}
