use crate::model::entity::Category;

/// Builds the instruction sent to the course generator. Inputs are embedded
/// verbatim; validation happens before this point.
pub fn build_course_prompt(title: &str, description: &str, category: Category) -> String {
    format!(
        r#"
You are an expert curriculum designer. Generate a comprehensive, structured course roadmap for the following course:

**Title:** {title}
**Category:** {category}
**Description:** {description}

Create a detailed course with:
- 6-8 modules (main topics)
- 3-5 subtopics (lessons) in each module
- For every subtopic:
  1. A video_url: do not provide real video links. Give a descriptive search term such as "python basics tutorial" or "introduction to machine learning", formatted as "search:descriptive search term"
  2. A 2-3 paragraph explanation of the topic (informative and beginner-friendly)

**IMPORTANT:** Return ONLY valid JSON in exactly this format, with no text before or after it:

{{
  "modules": [
    {{
      "title": "Module Title",
      "subtopics": [
        {{
          "title": "Subtopic Title",
          "video_url": "search:python tutorial for beginners",
          "content": "Detailed explanation in 2-3 paragraphs..."
        }}
      ]
    }}
  ]
}}

**CRITICAL INSTRUCTIONS**:
1. video_url must use the format "search:your search term here". Never use real video URLs or placeholders like EXAMPLE
2. Escape all text for JSON (use \n for newlines, escape quotes with \")
3. Keep content clean and readable, avoid special characters that break JSON
4. Generate educational, high-quality content suitable for learners
"#
    )
}
