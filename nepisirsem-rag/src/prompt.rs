//! Prompt assembly for grounded recipe answers.

use crate::document::SearchResult;

/// Sentence the model is told to use when the recipes do not contain the answer.
pub const REFUSAL_MESSAGE: &str =
    "Üzgünüm, elimdeki tariflerde bu sorunun cevabını bulamadım.";

/// Persona and answering policies, in Turkish.
pub const DEFAULT_INSTRUCTIONS: &str = "\
Sen bir Türk Mutfağı Yemek Asistanısın. Görevin, SADECE sana verilen tarifler \
üzerinden kullanıcının sorularını cevaplamaktır. Cevaplarını daima Türkçe vermelisin.

Lütfen kullanıcının sorgusunu analiz et ve şu kurallara göre cevapla:

1. **Tarif İsteği veya Detay Sorulursa (Yemek Adı Varsa):** Kullanıcı bir yemeğin adını \
sorduğunda ve bu yemek verilen tariflerde varsa, DAİMA o yemeğin tarifini tamamen sun: \
yemeğin adı, hazırlık süresi, pişirme süresi, malzeme listesi ve numaralandırılmış \
yapılış adımları. Bu durumda asla reddetme cümlesi kullanma.
2. **Malzeme ve/veya Kategori Tabanlı Öneri (Filtreleme):** Kullanıcının elindeki \
malzemeleri ve kategori isteğini uygula. Yalnızca malzeme ihtiyacı kullanıcının \
elindekileri aşmayan 2-3 uygun tarif öner; kısıt verilmemişse küçük bir seçki sun. Her \
öneri için eksik malzemeleri belirt. Tuz, su, karabiber ve yağ hiçbir zaman eksik \
malzeme sayılmaz.
3. **Konuşma Dışı Geri Bildirim veya Selamlaşma:** Kullanıcı 'tamam', 'teşekkürler', \
'merhaba' gibi ifadeler kullandığında, kibar ve kısa cevaplar ver; reddetme cümlesi \
kullanma.

Bu kuralların hiçbiri uymuyorsa ve cevap verilen tariflerde yoksa, yalnızca şu cümleyle \
cevap ver: ";

/// Builds the single prompt sent to the model for one question.
///
/// Segments are appended in a fixed order (instructions, retrieved chunks in
/// rank order, the question), so text inside a question or a chunk is never
/// interpreted as a placeholder.
///
/// ```rust
/// use nepisirsem_rag::PromptTemplate;
///
/// let prompt = PromptTemplate::default().render(&[], "Menemen nasıl yapılır?");
/// assert!(prompt.ends_with("Kullanıcının Sorgusu: Menemen nasıl yapılır?\n---\nCevabın:\n"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    instructions: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self { instructions: format!("{DEFAULT_INSTRUCTIONS}\"{REFUSAL_MESSAGE}\"") }
    }
}

impl PromptTemplate {
    /// Replace the instruction block.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn render(&self, results: &[SearchResult], question: &str) -> String {
        let context_len: usize = results.iter().map(|r| r.record.text.len() + 2).sum();
        let mut prompt =
            String::with_capacity(self.instructions.len() + context_len + question.len() + 96);

        prompt.push_str(&self.instructions);
        prompt.push_str("\n\n---\nVerilen Tarifler (Context):\n");
        for (i, result) in results.iter().enumerate() {
            if i > 0 {
                prompt.push_str("\n\n");
            }
            prompt.push_str(&result.record.text);
        }
        prompt.push_str("\n\n---\nKullanıcının Sorgusu: ");
        prompt.push_str(question);
        prompt.push_str("\n---\nCevabın:\n");
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Metadata, VectorRecord};

    fn result(id: &str, text: &str, score: f32) -> SearchResult {
        SearchResult {
            record: VectorRecord {
                id: id.to_string(),
                text: text.to_string(),
                embedding: vec![],
                metadata: Metadata::new(),
                document_id: "tarifler".to_string(),
            },
            score,
        }
    }

    #[test]
    fn chunks_appear_in_rank_order_separated_by_blank_lines() {
        let results = [result("a", "Menemen tarifi", 0.9), result("b", "Kısır tarifi", 0.7)];
        let prompt = PromptTemplate::default().render(&results, "Menemen?");

        assert!(prompt.contains("Verilen Tarifler (Context):\nMenemen tarifi\n\nKısır tarifi\n\n---"));
        assert!(prompt.contains("Kullanıcının Sorgusu: Menemen?"));
        assert!(prompt.starts_with("Sen bir Türk Mutfağı Yemek Asistanısın."));
    }

    #[test]
    fn instructions_carry_policies_and_refusal() {
        let prompt = PromptTemplate::default().render(&[], "merhaba");
        assert!(prompt.contains(REFUSAL_MESSAGE));
        assert!(prompt.contains("Tuz, su, karabiber ve yağ"));
        assert!(prompt.contains("'teşekkürler'"));
    }

    #[test]
    fn placeholder_like_text_is_inserted_literally() {
        let results = [result("a", "{input} değil {context}", 0.5)];
        let prompt = PromptTemplate::default().render(&results, "{context} nedir?");
        assert!(prompt.contains("Kullanıcının Sorgusu: {context} nedir?"));
        assert!(prompt.contains("{input} değil {context}"));
    }

    #[test]
    fn custom_instructions_replace_default() {
        let template = PromptTemplate::default().with_instructions("Kısa cevap ver.");
        assert!(template.render(&[], "x").starts_with("Kısa cevap ver.\n\n---"));
    }
}
