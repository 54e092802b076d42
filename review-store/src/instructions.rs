/// Fixed instruction block attached to every retrieval result for the
/// downstream answer generator.
pub const NEXT_ACTION: &str = "Use only question and retrieved_documents for the final response.
Do not invent facts outside retrieved context.

If answerable, return sections in this order:
1. Summary (3-5 bullets)
2. Stats
3. Evidence
4. Applied filters

Notes section is optional:
- Add Notes only when notes is non-empty.
- If Notes is included, use only the tool notes content and do not add extra commentary.

Applied filters rule:
- Mention only keys present in applied_filters.qdrant_filter.
- Do not mention unapplied or unsupported filters.
- If none were applied, say: No explicit filters applied.

Evidence rule:
- Provide 3-5 short quotes.
- For each quote include: id, device, date.
- Use format like: id=<id>, device=<device>, date=<date>.

If not answerable from retrieved context:
- Do not guess.
- Respond in 1-2 lines that retrieved reviews do not contain enough information.";
