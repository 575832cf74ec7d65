// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Just enough GLSL reading to simulate program introspection.

use prism_core::renderer::{UniformKind, UniformValue};

/// A top-level `in` or `uniform` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration<'a> {
    pub ty: &'a str,
    pub name: &'a str,
    pub location: Option<u32>,
    pub initializer: Option<&'a str>,
}

/// Finds the declarations using `qualifier` (`"in"` or `"uniform"`), in source order.
pub(crate) fn declarations<'a>(source: &'a str, qualifier: &str) -> Vec<Declaration<'a>> {
    let mut found = Vec::new();
    for line in source.lines() {
        let mut line = line.trim();
        let mut location = None;
        if let Some(rest) = line.strip_prefix("layout") {
            let Some((inside, after)) = rest.split_once(')') else {
                continue;
            };
            location = inside
                .trim_start_matches(|c: char| c == '(' || c.is_whitespace())
                .strip_prefix("location")
                .and_then(|v| v.trim().strip_prefix('='))
                .and_then(|v| v.trim().parse().ok());
            line = after.trim();
        }
        let Some(rest) = line.strip_prefix(qualifier) else {
            continue;
        };
        if !rest.starts_with(char::is_whitespace) {
            continue;
        }
        let Some((ty, rest)) = rest.trim_start().split_once(char::is_whitespace) else {
            continue;
        };
        let statement = rest.split(';').next().unwrap_or_default();
        let (name, initializer) = match statement.split_once('=') {
            Some((name, value)) => (name, Some(value.trim())),
            None => (statement, None),
        };
        let name = name.split('[').next().unwrap_or_default().trim();
        if !name.is_empty() {
            found.push(Declaration {
                ty,
                name,
                location,
                initializer,
            });
        }
    }
    found
}

/// The value a freshly linked program holds for a uniform: its initializer
/// when it is a literal or a constructor of literals, zero otherwise.
pub(crate) fn initial_value(kind: UniformKind, initializer: Option<&str>) -> UniformValue {
    initializer
        .and_then(|text| literal(kind, text))
        .unwrap_or_else(|| kind.zero())
}

fn literal(kind: UniformKind, text: &str) -> Option<UniformValue> {
    let arguments = match text.split_once('(') {
        Some((_, inside)) => inside.trim_end().strip_suffix(')')?,
        None => text,
    };
    let scalars = arguments
        .split(',')
        .map(|a| a.trim().trim_end_matches(['f', 'F']).parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    let components = match (kind, scalars.as_slice()) {
        // mat4(x) is x on the diagonal.
        (UniformKind::Mat4, [d]) => (0..16).map(|i| if i % 5 == 0 { *d } else { 0.0 }).collect(),
        (_, [s]) => vec![*s; kind.components()],
        _ => scalars,
    };
    UniformValue::from_components(kind, &components)
}

/// Maps a GLSL type name to a uniform kind, if the renderer supports it.
pub(crate) fn uniform_kind(ty: &str) -> Option<UniformKind> {
    Some(match ty {
        "float" => UniformKind::Float,
        "vec2" => UniformKind::Vec2,
        "vec3" => UniformKind::Vec3,
        "vec4" => UniformKind::Vec4,
        "mat4" => UniformKind::Mat4,
        "int" => UniformKind::Int,
        "sampler2D" => UniformKind::Sampler2D,
        _ => return None,
    })
}

/// Number of attribute slots a vertex input of this type occupies.
pub(crate) fn attribute_slots(ty: &str) -> u32 {
    match ty {
        "mat4" => 4,
        "mat3" => 3,
        "mat2" => 2,
        _ => 1,
    }
}

/// Returns the compiler log a driver would produce, or `None` if the stage compiles.
pub(crate) fn compile_log(source: &str) -> Option<String> {
    if source.trim().is_empty() {
        return Some("0:0: error: empty shader source".to_owned());
    }
    for (number, line) in source.lines().enumerate() {
        if let Some(message) = line.trim().strip_prefix("#error") {
            return Some(format!("0:{}: error: {}", number + 1, message.trim()));
        }
    }
    if !source.contains("void main") {
        return Some("0:0: error: missing entry point 'main'".to_owned());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_initialized_and_laid_out_declarations() {
        let src = "#version 330 core\n\
                   layout(location = 3) in vec3 a_normal;\n\
                   in mat4 a_instance_transform;\n\
                   uniform vec4 u_base_color = vec4(1.0);\n\
                   uniform float u_metallic;\n\
                   out vec4 v_color;\n";

        let inputs = declarations(src, "in");
        assert_eq!(
            inputs,
            vec![
                Declaration {
                    ty: "vec3",
                    name: "a_normal",
                    location: Some(3),
                    initializer: None,
                },
                Declaration {
                    ty: "mat4",
                    name: "a_instance_transform",
                    location: None,
                    initializer: None,
                },
            ]
        );

        let uniforms = declarations(src, "uniform");
        let names: Vec<_> = uniforms.iter().map(|d| d.name).collect();
        assert_eq!(names, ["u_base_color", "u_metallic"]);
        assert_eq!(uniforms[0].initializer, Some("vec4(1.0)"));
        assert_eq!(uniforms[1].initializer, None);
    }

    #[test]
    fn initializers_become_link_time_values() {
        assert_eq!(
            initial_value(UniformKind::Vec4, Some("vec4(1.0)")),
            UniformValue::Vec4([1.0; 4])
        );
        assert_eq!(
            initial_value(UniformKind::Vec3, Some("vec3(0.1, 0.2, 0.3)")),
            UniformValue::Vec3([0.1, 0.2, 0.3])
        );
        assert_eq!(initial_value(UniformKind::Float, Some("0.5")), UniformValue::Float(0.5));
        let UniformValue::Mat4(identity) = initial_value(UniformKind::Mat4, Some("mat4(1.0)")) else {
            panic!("expected a mat4 payload");
        };
        assert_eq!(identity[0], 1.0);
        assert_eq!(identity[1], 0.0);
        assert_eq!(identity[15], 1.0);
    }

    #[test]
    fn missing_or_unreadable_initializers_are_zero() {
        assert_eq!(initial_value(UniformKind::Float, None), UniformValue::Float(0.0));
        assert_eq!(initial_value(UniformKind::Sampler2D, None), UniformValue::Int(0));
        assert_eq!(
            initial_value(UniformKind::Vec4, Some("vec4(vec3(1.0), 1.0)")),
            UniformValue::Vec4([0.0; 4])
        );
        assert_eq!(
            initial_value(UniformKind::Vec3, Some("vec3(1.0, 2.0)")),
            UniformValue::Vec3([0.0; 3])
        );
    }

    #[test]
    fn error_directive_fails_compilation() {
        let log = compile_log("#version 330 core\n#error broken on purpose\nvoid main() {}");
        assert_eq!(log.as_deref(), Some("0:2: error: broken on purpose"));
        assert!(compile_log("void main() {}").is_none());
        assert!(compile_log("   ").is_some());
    }
}
