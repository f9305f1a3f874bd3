//! XML problem loader.
//!
//! The input document is rooted at `<examtt>` with `<periods>`, `<rooms>`,
//! `<exams>`, `<students>`, `<instructors>`, `<constraints>` and an optional
//! `<assignments>` section carrying the initial solution of a re-solve run.

use super::ProblemLoader;
use crate::config::SolverConfig;
use crate::model::{DistributionType, ExamModel, ModelBuilder};
use crate::SolverError;
use roxmltree::{Document, Node};
use std::collections::HashMap;

pub struct ExamXmlLoader;

fn malformed(message: impl Into<String>) -> SolverError {
    SolverError::MalformedInput(message.into())
}

fn req_attr<'a>(node: &Node<'a, '_>, name: &str) -> Result<&'a str, SolverError> {
    node.attribute(name).ok_or_else(|| {
        malformed(format!(
            "<{}> is missing the {} attribute",
            node.tag_name().name(),
            name
        ))
    })
}

fn parse_attr<T: std::str::FromStr>(
    node: &Node<'_, '_>,
    name: &str,
    default: T,
) -> Result<T, SolverError> {
    match node.attribute(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| {
            malformed(format!(
                "<{}> has an unparseable {} attribute: {:?}",
                node.tag_name().name(),
                name,
                raw
            ))
        }),
    }
}

fn parse_bool_attr(node: &Node<'_, '_>, name: &str, default: bool) -> Result<bool, SolverError> {
    match node.attribute(name) {
        None => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(raw) => Err(malformed(format!(
            "<{}> has an unparseable {} attribute: {:?}",
            node.tag_name().name(),
            name,
            raw
        ))),
    }
}

fn elements<'a, 'd>(node: &Node<'a, 'd>, name: &'static str) -> impl Iterator<Item = Node<'a, 'd>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

impl ProblemLoader for ExamXmlLoader {
    fn load(&self, input: &str, config: &SolverConfig) -> Result<ExamModel, SolverError> {
        let doc =
            Document::parse(input).map_err(|e| malformed(format!("XML parse error: {}", e)))?;
        let root = doc.root_element();
        if root.tag_name().name() != "examtt" {
            return Err(malformed(format!(
                "root element <{}> is not <examtt>",
                root.tag_name().name()
            )));
        }

        let mut builder = ModelBuilder::new();
        let mut periods: HashMap<String, usize> = HashMap::new();
        let mut rooms: HashMap<String, usize> = HashMap::new();
        let mut exams: HashMap<String, usize> = HashMap::new();

        for section in elements(&root, "periods") {
            for node in elements(&section, "period") {
                let id = req_attr(&node, "id")?;
                let period = builder.add_period(
                    id,
                    req_attr(&node, "day")?,
                    req_attr(&node, "time")?,
                    parse_attr(&node, "length", 0u32)?,
                    parse_attr(&node, "penalty", 0i32)?,
                );
                periods.insert(id.to_string(), period);
            }
        }

        for section in elements(&root, "rooms") {
            for node in elements(&section, "room") {
                let id = req_attr(&node, "id")?;
                let size = parse_attr(&node, "size", 0usize)?;
                let coordinates = match node.attribute("coordinates") {
                    None => None,
                    Some(raw) => {
                        let (x, y) = raw
                            .split_once(',')
                            .and_then(|(x, y)| Some((x.trim().parse().ok()?, y.trim().parse().ok()?)))
                            .ok_or_else(|| {
                                malformed(format!("room {}: bad coordinates {:?}", id, raw))
                            })?;
                        Some((x, y))
                    }
                };
                let room = builder.add_room(
                    id,
                    node.attribute("name").unwrap_or(id),
                    size,
                    parse_attr(&node, "alt", size)?,
                    coordinates,
                );
                rooms.insert(id.to_string(), room);
                for override_node in elements(&node, "period") {
                    let period = lookup(&periods, req_attr(&override_node, "id")?, "period")?;
                    if !parse_bool_attr(&override_node, "available", true)? {
                        builder.set_room_availability(room, period, false);
                    }
                    let penalty = parse_attr(&override_node, "penalty", 0i32)?;
                    if penalty != 0 {
                        builder.set_room_period_weight(room, period, penalty);
                    }
                }
            }
        }

        for section in elements(&root, "exams") {
            for node in elements(&section, "exam") {
                let id = req_attr(&node, "id")?;
                let max_rooms = parse_attr(&node, "maxRooms", 0usize)?;
                let average = match node.attribute("average") {
                    None => None,
                    Some(_) => Some(parse_attr(&node, "average", 0u32)?),
                };
                let exam = builder.add_exam(
                    id,
                    parse_attr(&node, "length", 0u32)?,
                    parse_attr(&node, "size", 0usize)?,
                    (max_rooms > 0).then_some(max_rooms),
                    parse_bool_attr(&node, "alt", false)?,
                    average,
                );
                exams.insert(id.to_string(), exam);
                for pref in elements(&node, "period") {
                    let period = lookup(&periods, req_attr(&pref, "id")?, "period")?;
                    builder.allow_period(exam, period, parse_attr(&pref, "penalty", 0i32)?);
                }
                for pref in elements(&node, "room") {
                    let room = lookup(&rooms, req_attr(&pref, "id")?, "room")?;
                    builder.allow_room(exam, room, parse_attr(&pref, "penalty", 0i32)?);
                }
            }
        }

        for section in elements(&root, "students") {
            for node in elements(&section, "student") {
                let student = builder.add_student(req_attr(&node, "id")?);
                for enrollment in elements(&node, "exam") {
                    let exam = lookup(&exams, req_attr(&enrollment, "id")?, "exam")?;
                    builder.enroll_student(student, exam);
                }
                for unavailable in elements(&node, "unavailable") {
                    let period = lookup(&periods, req_attr(&unavailable, "period")?, "period")?;
                    builder.set_student_unavailable(student, period);
                }
            }
        }

        for section in elements(&root, "instructors") {
            for node in elements(&section, "instructor") {
                let instructor = builder.add_instructor(req_attr(&node, "id")?);
                for assignment in elements(&node, "exam") {
                    let exam = lookup(&exams, req_attr(&assignment, "id")?, "exam")?;
                    builder.assign_instructor(instructor, exam);
                }
                for unavailable in elements(&node, "unavailable") {
                    let period = lookup(&periods, req_attr(&unavailable, "period")?, "period")?;
                    builder.set_instructor_unavailable(instructor, period);
                }
            }
        }

        for section in elements(&root, "constraints") {
            for node in section.children().filter(Node::is_element) {
                let name = node.tag_name().name();
                let dtype = DistributionType::from_name(name)
                    .ok_or_else(|| malformed(format!("unknown constraint type <{}>", name)))?;
                let mut members = Vec::new();
                for member in elements(&node, "exam") {
                    members.push(lookup(&exams, req_attr(&member, "id")?, "exam")?);
                }
                builder.add_distribution(
                    dtype,
                    parse_bool_attr(&node, "hard", true)?,
                    parse_attr(&node, "weight", 1.0f64)?,
                    members,
                );
            }
        }

        for section in elements(&root, "assignments") {
            for node in elements(&section, "assignment") {
                let exam = lookup(&exams, req_attr(&node, "exam")?, "exam")?;
                let period = lookup(&periods, req_attr(&node, "period")?, "period")?;
                let mut assigned_rooms = Vec::new();
                for room_id in req_attr(&node, "rooms")?.split_whitespace() {
                    assigned_rooms.push(lookup(&rooms, room_id, "room")?);
                }
                builder.set_initial(exam, period, assigned_rooms);
            }
        }

        builder.build(config)
    }
}

fn lookup(table: &HashMap<String, usize>, id: &str, kind: &str) -> Result<usize, SolverError> {
    table
        .get(id)
        .copied()
        .ok_or_else(|| malformed(format!("reference to unknown {} id: {}", kind, id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DistributionType;

    const SMALL: &str = r#"<examtt>
      <periods>
        <period id="1" day="day1" time="08:00" length="120" penalty="0"/>
        <period id="2" day="day1" time="10:00" length="90" penalty="1"/>
      </periods>
      <rooms>
        <room id="A" name="Hall A" size="100" alt="140" coordinates="1.5, 2.5">
          <period id="2" available="false"/>
        </room>
        <room id="B" size="40"/>
      </rooms>
      <exams>
        <exam id="X" length="120" maxRooms="2" average="1">
          <period id="1" penalty="0"/>
          <room id="A" penalty="-1"/>
        </exam>
        <exam id="Y" length="90"/>
      </exams>
      <students>
        <student id="s1"><exam id="X"/><exam id="Y"/><unavailable period="2"/></student>
      </students>
      <instructors>
        <instructor id="i1"><exam id="Y"/></instructor>
      </instructors>
      <constraints>
        <different-period hard="true"><exam id="X"/><exam id="Y"/></different-period>
      </constraints>
      <assignments>
        <assignment exam="X" period="1" rooms="A"/>
      </assignments>
    </examtt>"#;

    #[test]
    fn loads_a_complete_document() {
        let model = ExamXmlLoader.load(SMALL, &SolverConfig::new()).unwrap();
        assert_eq!(model.periods().len(), 2);
        assert_eq!(model.rooms().len(), 2);
        assert_eq!(model.exams().len(), 2);

        let a = model.room_by_external("A").unwrap();
        assert!(!model.room(a).available[1]);
        assert_eq!(model.room(a).alt_size, 140);
        assert_eq!(model.room(a).coordinates, Some((1.5, 2.5)));
        // Room B gets alt = size when no alt attribute is present.
        let b = model.room_by_external("B").unwrap();
        assert_eq!(model.room(b).alt_size, 40);

        let x = model.exam_by_external("X").unwrap();
        assert_eq!(model.exam(x).max_rooms, 2);
        assert_eq!(model.exam(x).average_period, Some(1));
        assert_eq!(model.exam(x).periods.len(), 1);
        assert_eq!(model.exam(x).initial, Some((0, vec![a])));
        assert_eq!(model.exam(x).size, 1);

        assert!(model.student(0).unavailable[1]);
        assert_eq!(model.instructor(0).exams, vec![1]);

        let dc = model.distribution(0);
        assert_eq!(dc.dtype, DistributionType::DifferentPeriod);
        assert!(dc.hard);
    }

    #[test]
    fn rejects_non_examtt_roots() {
        let err = ExamXmlLoader
            .load("<timetable/>", &SolverConfig::new())
            .unwrap_err();
        assert!(matches!(err, SolverError::MalformedInput(_)));
    }

    #[test]
    fn rejects_unknown_references() {
        let doc = SMALL.replace("<exam id=\"Y\"/></student>", "<exam id=\"Z\"/></student>");
        let err = ExamXmlLoader.load(&doc, &SolverConfig::new()).unwrap_err();
        assert!(err.to_string().contains("unknown exam id: Z"));
    }

    #[test]
    fn rejects_unknown_constraint_types() {
        let doc = SMALL.replace("different-period", "same-building");
        let err = ExamXmlLoader.load(&doc, &SolverConfig::new()).unwrap_err();
        assert!(matches!(err, SolverError::MalformedInput(_)));
    }

    #[test]
    fn rejects_unparseable_numbers() {
        let doc = SMALL.replace("size=\"100\"", "size=\"big\"");
        let err = ExamXmlLoader.load(&doc, &SolverConfig::new()).unwrap_err();
        assert!(matches!(err, SolverError::MalformedInput(_)));
    }
}
