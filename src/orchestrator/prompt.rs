//! Strategy prompt construction

/// Build the generation instruction for a company description.
///
/// The description is embedded verbatim; the schema itself travels
/// separately in the request.
pub fn build_prompt(description: &str) -> String {
    format!(
        r#"Actúa como un consultor experto en Transformación Digital y GenAI de alto nivel (McKinsey, BCG).
Genera una estrategia detallada de adopción de IA Generativa para la siguiente empresa de e-commerce:
"{}"

Debes devolver un JSON válido con la siguiente estructura y contenido en Español.
Asegúrate de llenar TODOS los campos requeridos."#,
        description
    )
}
