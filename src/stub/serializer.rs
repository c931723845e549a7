use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use super::model::{RemoteClass, RemoteMethod};

/// Renders a finished stub model into an artifact.
pub trait StubSerializer {
    /// File extension of produced artifacts, without the dot.
    fn extension(&self) -> &str;

    fn serialize(&self, class: &RemoteClass, writer: &mut dyn Write) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StubFormat {
    /// JavaScript HTTP-RMI client stub.
    #[default]
    Script,
    /// The stub model as JSON.
    Json,
}

impl StubFormat {
    pub fn default_extension(self) -> &'static str {
        match self {
            StubFormat::Script => "js",
            StubFormat::Json => "json",
        }
    }

    pub fn serializer(self, extension: Option<&str>) -> Box<dyn StubSerializer> {
        let extension = extension
            .map(|ext| ext.trim_start_matches('.'))
            .unwrap_or(self.default_extension())
            .to_string();
        match self {
            StubFormat::Script => Box::new(ScriptSerializer { extension }),
            StubFormat::Json => Box::new(JsonSerializer { extension }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScriptSerializer {
    extension: String,
}

impl Default for ScriptSerializer {
    fn default() -> Self {
        Self {
            extension: StubFormat::Script.default_extension().to_string(),
        }
    }
}

impl StubSerializer for ScriptSerializer {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn serialize(&self, class: &RemoteClass, writer: &mut dyn Write) -> io::Result<()> {
        writeln!(
            writer,
            "// Generated by rmistub from {}. Do not edit.",
            class.qualified_name()
        )?;
        if class.package_name().is_empty() {
            writeln!(writer)?;
        } else {
            writeln!(writer, "$package(\"{}\");", class.package_name())?;
            writeln!(writer)?;
        }

        writeln!(writer, "/**")?;
        writeln!(writer, " * HTTP-RMI client stub for {}.", class.qualified_name())?;
        writeln!(writer, " */")?;
        if class.package_name().is_empty() {
            writeln!(writer, "var {} = {{", class.class_name())?;
        } else {
            writeln!(writer, "{} = {{", class.qualified_name())?;
        }

        let count = class.methods().len();
        for (idx, method) in class.methods().iter().enumerate() {
            write_method(writer, class, method)?;
            if idx + 1 < count {
                writeln!(writer, ",")?;
                writeln!(writer)?;
            } else {
                writeln!(writer)?;
            }
        }

        writeln!(writer, "}};")
    }
}

fn write_method(writer: &mut dyn Write, class: &RemoteClass, method: &RemoteMethod) -> io::Result<()> {
    let names = parameter_identifiers(method);
    let arity = names.len();

    writeln!(writer, "\t/**")?;
    writeln!(writer, "\t * Remote method {}.", method.name())?;
    writeln!(writer, "\t *")?;
    for param in method.parameters() {
        writeln!(writer, "\t * @param {} {}", param.ty, param.name)?;
    }
    writeln!(
        writer,
        "\t * @param Function callback optional function invoked with the remote result,"
    )?;
    writeln!(
        writer,
        "\t * @param Object scope optional callback scope, default to global scope."
    )?;
    if !method.is_void() {
        writeln!(writer, "\t * @return {}", method.return_type())?;
    }
    for exception in method.exceptions() {
        writeln!(writer, "\t * @throws {exception}")?;
    }
    writeln!(writer, "\t */")?;

    writeln!(
        writer,
        "\t{}: function({}) {{",
        script_identifier(method.name()),
        names.join(", ")
    )?;
    writeln!(writer, "\t\tvar __callback__ = arguments[{arity}];")?;
    writeln!(
        writer,
        "\t\tvar __scope__ = arguments[{}] || window;",
        arity + 1
    )?;
    writeln!(writer, "\t\tvar rmi = new js.net.RMI();")?;
    writeln!(
        writer,
        "\t\trmi.setMethod(\"{}\", \"{}\");",
        class.qualified_name(),
        method.name()
    )?;
    if !names.is_empty() {
        writeln!(writer, "\t\trmi.setParameters({});", names.join(", "))?;
    }
    writeln!(writer, "\t\trmi.exec(__callback__, __scope__);")?;
    write!(writer, "\t}}")
}

const SCRIPT_RESERVED: &[&str] = &[
    "arguments", "await", "debugger", "delete", "eval", "export", "function", "in", "let",
    "typeof", "var", "with", "yield",
];

/// Java identifiers that are reserved in scripts get a trailing underscore.
fn script_identifier(name: &str) -> String {
    if SCRIPT_RESERVED.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Locals declared by every generated method body.
const STUB_LOCALS: &[&str] = &["rmi", "__callback__", "__scope__"];

/// Parameter names as script identifiers, kept clear of the body's locals and
/// of each other.
fn parameter_identifiers(method: &RemoteMethod) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(method.parameters().len());
    for param in method.parameters() {
        let mut name = script_identifier(&param.name);
        while STUB_LOCALS.contains(&name.as_str()) || names.contains(&name) {
            name.push('_');
        }
        names.push(name);
    }
    names
}

#[derive(Debug, Clone)]
pub struct JsonSerializer {
    extension: String,
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self {
            extension: StubFormat::Json.default_extension().to_string(),
        }
    }
}

impl StubSerializer for JsonSerializer {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn serialize(&self, class: &RemoteClass, writer: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, class)?;
        writeln!(writer)
    }
}
