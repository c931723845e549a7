use serde::Serialize;

/// Stub model for one remote interface or class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteClass {
    qualified_name: String,
    package_name: String,
    class_name: String,
    methods: Vec<RemoteMethod>,
}

impl RemoteClass {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        let qualified_name = qualified_name.into();
        let (package_name, class_name) = match qualified_name.rsplit_once('.') {
            Some((package, class)) => (package.to_string(), class.to_string()),
            None => (String::new(), qualified_name.clone()),
        };
        Self {
            qualified_name,
            package_name,
            class_name,
            methods: Vec::new(),
        }
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Empty for the default package.
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn methods(&self) -> &[RemoteMethod] {
        &self.methods
    }

    pub fn add_method(&mut self, method: RemoteMethod) {
        self.methods.push(method);
    }

    pub fn has_methods(&self) -> bool {
        !self.methods.is_empty()
    }

    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.class_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMethod {
    name: String,
    return_type: String,
    parameters: Vec<Parameter>,
    exceptions: Vec<String>,
}

impl RemoteMethod {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            parameters: Vec::new(),
            exceptions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn exceptions(&self) -> &[String] {
        &self.exceptions
    }

    pub fn add_parameter(&mut self, ty: impl Into<String>, name: impl Into<String>) {
        self.parameters.push(Parameter {
            ty: ty.into(),
            name: name.into(),
        });
    }

    /// Keeps declaration order; a repeated type is recorded once.
    pub fn add_exception(&mut self, ty: impl Into<String>) {
        let ty = ty.into();
        if !self.exceptions.contains(&ty) {
            self.exceptions.push(ty);
        }
    }

    pub fn is_void(&self) -> bool {
        self.return_type == "void"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub ty: String,
    pub name: String,
}
